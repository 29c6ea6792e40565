use std::path::{Path, PathBuf};

use walkdir::WalkDir;

const INPUT_EXTENSIONS: &[&str] = &["xml", "osis"];

pub fn is_osis_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// First `.xml` or `.osis` file found under the search directories.
///
/// Directories are tried in the given order, each one walked with entries
/// sorted by file name. Missing directories are skipped.
pub fn find_input<P: AsRef<Path>>(search_dirs: &[P]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|dir| dir.as_ref())
        .filter(|dir| dir.is_dir())
        .find_map(|dir| {
            WalkDir::new(dir)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .find(|entry| entry.file_type().is_file() && is_osis_file(entry.path()))
                .map(|entry| entry.into_path())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_osis_file() {
        assert!(is_osis_file(Path::new("kjv.xml")));
        assert!(is_osis_file(Path::new("dir/KJV.OSIS")));
        assert!(!is_osis_file(Path::new("kjv.zip")));
        assert!(!is_osis_file(Path::new("xml")));
    }

    #[test]
    fn test_find_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("kjv2006");
        let second = dir.path().join("downloads");
        fs::create_dir_all(first.join("nested")).unwrap();
        fs::create_dir_all(&second).unwrap();

        fs::write(second.join("a.xml"), "<osis/>").unwrap();
        assert_eq!(find_input(&[&first, &second]), Some(second.join("a.xml")));

        fs::write(first.join("readme.txt"), "").unwrap();
        fs::write(first.join("nested/kjv.osis"), "<osis/>").unwrap();
        fs::write(first.join("b.xml"), "<osis/>").unwrap();
        assert_eq!(find_input(&[&first, &second]), Some(first.join("b.xml")));
    }

    #[test]
    fn test_find_input_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_input(&[dir.path().join("nope")]), None);
        assert_eq!(find_input(&[dir.path()]), None);
    }
}
