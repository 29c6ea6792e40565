use scripture_backend::{extract_str, ChapterRecord, ExtractOptions, ExtractStats};

/// Wrap body markup in an OSIS document skeleton.
#[allow(dead_code)]
pub fn osis_doc(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<osis xmlns="http://www.bibletechnologies.net/2003/OSIS/namespace">
<osisText osisIDWork="KJV">
<header><work osisWork="KJV"><title>King James Version</title></work></header>
{}
</osisText>
</osis>"#,
        body
    )
}

#[allow(dead_code)]
pub fn extract(body: &str) -> (Vec<ChapterRecord>, ExtractStats) {
    extract_with(body, &ExtractOptions::default())
}

#[allow(dead_code)]
pub fn extract_with(body: &str, options: &ExtractOptions) -> (Vec<ChapterRecord>, ExtractStats) {
    extract_str(&osis_doc(body), options).unwrap()
}

/// Text of one verse, panicking with a readable message when absent.
#[allow(dead_code)]
pub fn verse_text<'a>(records: &'a [ChapterRecord], book: &str, chapter: u32, verse: u32) -> &'a str {
    records
        .iter()
        .find(|r| r.book == book && r.chapter == chapter)
        .and_then(|r| r.verses.iter().find(|v| v.verse == verse))
        .map(|v| v.text.as_str())
        .unwrap_or_else(|| panic!("No verse {} {}:{} in {:?}", book, chapter, verse, records))
}
