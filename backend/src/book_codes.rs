//! OSIS book codes and osisID parsing
//!
//! Maps source book codes (`Gen`, `1Cor`, ...) to the lowercase slugs used as
//! output directory names, and turns `Book.Chapter.Verse` identifiers into
//! addresses. An unknown code is a normal outcome: the caller skips the
//! content it belongs to.

use std::collections::HashMap;
use lazy_static::lazy_static;

use crate::types::{ChapterAddress, VerseAddress};

/// OSIS book codes in canonical order
pub const BOOKS: &[(&str, &str)] = &[
    // Old Testament
    ("Gen", "genesis"), ("Exod", "exodus"), ("Lev", "leviticus"), ("Num", "numbers"),
    ("Deut", "deuteronomy"), ("Josh", "joshua"), ("Judg", "judges"), ("Ruth", "ruth"),
    ("1Sam", "1samuel"), ("2Sam", "2samuel"), ("1Kgs", "1kings"), ("2Kgs", "2kings"),
    ("1Chr", "1chronicles"), ("2Chr", "2chronicles"), ("Ezra", "ezra"), ("Neh", "nehemiah"),
    ("Esth", "esther"), ("Job", "job"), ("Ps", "psalms"), ("Prov", "proverbs"),
    ("Eccl", "ecclesiastes"), ("Song", "songofsolomon"), ("Isa", "isaiah"), ("Jer", "jeremiah"),
    ("Lam", "lamentations"), ("Ezek", "ezekiel"), ("Dan", "daniel"), ("Hos", "hosea"),
    ("Joel", "joel"), ("Amos", "amos"), ("Obad", "obadiah"), ("Jonah", "jonah"),
    ("Mic", "micah"), ("Nah", "nahum"), ("Hab", "habakkuk"), ("Zeph", "zephaniah"),
    ("Hag", "haggai"), ("Zech", "zechariah"), ("Mal", "malachi"),
    // New Testament
    ("Matt", "matthew"), ("Mark", "mark"), ("Luke", "luke"), ("John", "john"),
    ("Acts", "acts"), ("Rom", "romans"), ("1Cor", "1corinthians"), ("2Cor", "2corinthians"),
    ("Gal", "galatians"), ("Eph", "ephesians"), ("Phil", "philippians"), ("Col", "colossians"),
    ("1Thess", "1thessalonians"), ("2Thess", "2thessalonians"), ("1Tim", "1timothy"),
    ("2Tim", "2timothy"), ("Titus", "titus"), ("Phlm", "philemon"), ("Heb", "hebrews"),
    ("Jas", "james"), ("1Pet", "1peter"), ("2Pet", "2peter"), ("1John", "1john"),
    ("2John", "2john"), ("3John", "3john"), ("Jude", "jude"), ("Rev", "revelation"),
];

/// Alternate codes seen in the wild
const ALIASES: &[(&str, &str)] = &[
    ("Psa", "psalms"),
];

lazy_static! {
    static ref SLUG_BY_CODE: HashMap<&'static str, &'static str> = BOOKS
        .iter()
        .chain(ALIASES.iter())
        .copied()
        .collect();

    static ref CANONICAL_ORDER: HashMap<&'static str, usize> = BOOKS
        .iter()
        .enumerate()
        .map(|(idx, (_, slug))| (*slug, idx))
        .collect();
}

/// Why an identifier did not resolve to an address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdRejection {
    /// Wrong shape, non-numeric or non-positive numbers
    Malformed,
    /// Well-formed, but the book code is not in the table
    UnknownBook,
}

/// Map an OSIS book code to its output slug.
pub fn normalize_book_code(code: &str) -> Option<&'static str> {
    SLUG_BY_CODE.get(code).copied()
}

/// Position of a slug in the canonical book order, unknown slugs sort last.
pub fn canonical_index(slug: &str) -> usize {
    CANONICAL_ORDER.get(slug).copied().unwrap_or(usize::MAX)
}

/// The book table in canonical order, aliases excluded.
pub fn known_book_codes() -> impl Iterator<Item = (&'static str, &'static str)> {
    BOOKS.iter().copied()
}

/// Parse `Book.Chapter.Verse`. Trailing components are ignored.
///
/// An attribute may list several ids separated by spaces, only the first one
/// is used.
pub fn parse_verse_id(id: &str) -> Result<VerseAddress, IdRejection> {
    let parts = split_id(id);
    if parts.len() < 3 {
        return Err(IdRejection::Malformed);
    }

    let chapter = parse_positive(parts[1]).ok_or(IdRejection::Malformed)?;
    let verse = parse_positive(parts[2]).ok_or(IdRejection::Malformed)?;
    let book = normalize_book_code(parts[0]).ok_or(IdRejection::UnknownBook)?;

    Ok(VerseAddress { book, chapter, verse })
}

/// Parse `Book.Chapter`. Trailing components are ignored.
pub fn parse_chapter_id(id: &str) -> Result<ChapterAddress, IdRejection> {
    let parts = split_id(id);
    if parts.len() < 2 {
        return Err(IdRejection::Malformed);
    }

    let chapter = parse_positive(parts[1]).ok_or(IdRejection::Malformed)?;
    let book = normalize_book_code(parts[0]).ok_or(IdRejection::UnknownBook)?;

    Ok(ChapterAddress { book, chapter })
}

/// Parse a book-level id such as `John`, which may also appear as `John.1`.
pub fn parse_book_id(id: &str) -> Result<&'static str, IdRejection> {
    let parts = split_id(id);
    match parts.first() {
        Some(code) if !code.is_empty() => {
            normalize_book_code(code).ok_or(IdRejection::UnknownBook)
        }
        _ => Err(IdRejection::Malformed),
    }
}

fn split_id(id: &str) -> Vec<&str> {
    let first = id.split_whitespace().next().unwrap_or("");
    if first.is_empty() {
        return Vec::new();
    }
    first.split('.').collect()
}

fn parse_positive(s: &str) -> Option<u32> {
    match s.parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_and_alias() {
        assert_eq!(normalize_book_code("Gen"), Some("genesis"));
        assert_eq!(normalize_book_code("1Cor"), Some("1corinthians"));
        assert_eq!(normalize_book_code("Ps"), Some("psalms"));
        assert_eq!(normalize_book_code("Psa"), Some("psalms"));
        assert_eq!(normalize_book_code("Xyz"), None);
        // OSIS codes are case-sensitive
        assert_eq!(normalize_book_code("gen"), None);
    }

    #[test]
    fn test_table_has_66_books_with_unique_slugs() {
        assert_eq!(BOOKS.len(), 66);
        let slugs: std::collections::HashSet<_> = BOOKS.iter().map(|(_, s)| *s).collect();
        assert_eq!(slugs.len(), 66);
    }

    #[test]
    fn test_parse_verse_id() {
        let addr = parse_verse_id("John.3.16").unwrap();
        assert_eq!(addr, VerseAddress { book: "john", chapter: 3, verse: 16 });

        let addr = parse_verse_id("1Chr.1.1.extra").unwrap();
        assert_eq!(addr, VerseAddress { book: "1chronicles", chapter: 1, verse: 1 });

        let addr = parse_verse_id(" Gen.1.1 Gen.1.2").unwrap();
        assert_eq!(addr.verse, 1);
    }

    #[test]
    fn test_parse_verse_id_rejections() {
        assert_eq!(parse_verse_id("John.3"), Err(IdRejection::Malformed));
        assert_eq!(parse_verse_id("John.x.1"), Err(IdRejection::Malformed));
        assert_eq!(parse_verse_id("John.0.1"), Err(IdRejection::Malformed));
        assert_eq!(parse_verse_id("John.1.-1"), Err(IdRejection::Malformed));
        assert_eq!(parse_verse_id(""), Err(IdRejection::Malformed));
        assert_eq!(parse_verse_id("Xyz.1.1"), Err(IdRejection::UnknownBook));
    }

    #[test]
    fn test_parse_chapter_and_book_ids() {
        assert_eq!(
            parse_chapter_id("Ps.119"),
            Ok(ChapterAddress { book: "psalms", chapter: 119 })
        );
        assert_eq!(parse_chapter_id("Ps"), Err(IdRejection::Malformed));
        assert_eq!(parse_book_id("Rev"), Ok("revelation"));
        assert_eq!(parse_book_id("Tob"), Err(IdRejection::UnknownBook));
    }

    #[test]
    fn test_canonical_index() {
        assert_eq!(canonical_index("genesis"), 0);
        assert!(canonical_index("matthew") > canonical_index("malachi"));
        assert_eq!(canonical_index("tobit"), usize::MAX);
    }
}
