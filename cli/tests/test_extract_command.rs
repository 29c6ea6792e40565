use std::fs;
use std::process::Command;

const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osis xmlns="http://www.bibletechnologies.net/2003/OSIS/namespace">
<osisText osisIDWork="KJV">
<div type="book" osisID="John">
<chapter sID="John.1"/>
<verse sID="John.1.1"/><w>In</w> <w>the</w> <w>beginning</w> <w>was</w> <w>the</w> <w lemma="strong:G3056">Word</w><verse eID="John.1.1"/>
<chapter eID="John.1"/>
</div>
</osisText>
</osis>"#;

fn scripture() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scripture"));
    for var in [
        "SCRIPTURE_INPUT",
        "SCRIPTURE_OUTPUT_DIR",
        "SCRIPTURE_NO_LEXICAL",
        "SCRIPTURE_EMIT_EMPTY_CHAPTERS",
        "SCRIPTURE_LOG_FILE",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("LOG_LEVEL", "silent");
    cmd
}

#[test]
fn test_extract_writes_chapter_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("kjv.xml");
    fs::write(&input, DOC).unwrap();
    let out_dir = dir.path().join("KJV");

    let output = scripture()
        .current_dir(dir.path())
        .args(["extract", "--input"])
        .arg(&input)
        .arg("--output-dir")
        .arg(&out_dir)
        .arg("--compact")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Verses:   1"));

    let chapter = fs::read_to_string(out_dir.join("john/01.json")).unwrap();
    assert_eq!(
        chapter,
        r#"{"book":"john","chapter":1,"verses":[{"v":1,"t":"In the beginning was the Word{G3056}"}]}"#
    );
    assert!(out_dir.join("index.json").exists());
}

#[test]
fn test_extract_options_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("kjv.xml");
    fs::write(&input, DOC).unwrap();
    let out_dir = dir.path().join("plain");

    let output = scripture()
        .current_dir(dir.path())
        .env("SCRIPTURE_INPUT", &input)
        .env("SCRIPTURE_OUTPUT_DIR", &out_dir)
        .env("SCRIPTURE_NO_LEXICAL", "true")
        .args(["extract", "--no-index"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let chapter = fs::read_to_string(out_dir.join("john/01.json")).unwrap();
    assert!(chapter.contains("In the beginning was the Word\""));
    assert!(!out_dir.join("index.json").exists());
}

#[test]
fn test_extract_discovers_input_in_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let downloads = dir.path().join("downloads/kjv2006");
    fs::create_dir_all(&downloads).unwrap();
    fs::write(downloads.join("kjv.osis"), DOC).unwrap();

    let output = scripture()
        .current_dir(dir.path())
        .arg("extract")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(dir.path().join("data/bible/KJV/john/01.json").exists());
}

#[test]
fn test_extract_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = scripture()
        .current_dir(dir.path())
        .args(["extract", "--input", "missing.xml"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.xml"));
}

#[test]
fn test_books_lists_table() {
    let output = scripture().arg("books").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "Gen\tgenesis"));
    assert!(stdout.lines().any(|l| l == "Rev\trevelation"));
}

#[test]
fn test_log_level_option() {
    let output = scripture().args(["--log-level", "debug", "books"]).output().unwrap();
    assert!(output.status.success());

    let output = scripture().args(["--log-level", "loud", "books"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid log level"));
}
