mod helpers;

use helpers::{extract, verse_text};

#[test]
fn test_container_verses_with_annotation_and_note() {
    let body = r#"<div type="book" osisID="Gen">
<chapter osisID="Gen.1">
<verse osisID="Gen.1.1"><w lemma="strong:H07225">In the beginning</w> <w lemma="strong:H0430">God</w> created<note type="explanation">see footnote</note> the heaven.</verse>
<verse osisID="Gen.1.2"><w>And</w> <w>the</w> <w>earth</w> <w>was</w> <w>without</w> <w>form</w>, <w>and</w> <w>void</w>;</verse>
</chapter>
</div>"#;

    let (records, stats) = extract(body);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].book, "genesis");
    let v1 = verse_text(&records, "genesis", 1, 1);
    assert_eq!(v1, "In the beginning{H7225} God{H430} created the heaven.");
    assert!(!v1.contains("see footnote"));
    assert_eq!(
        verse_text(&records, "genesis", 1, 2),
        "And the earth was without form, and void;"
    );
    assert_eq!(stats.chapters_emitted, 1);
    assert_eq!(stats.skipped_signals(), 0);
}

#[test]
fn test_container_verse_nested_in_paragraph() {
    let body = r#"<div type="book" osisID="Matt">
<chapter osisID="Matt.5">
<p><verse osisID="Matt.5.3">Blessed <hi type="italic">are</hi> the poor in spirit</verse>
<verse osisID="Matt.5.4">Blessed <hi type="italic">are</hi> they that mourn</verse></p>
</chapter>
</div>"#;

    let (records, _) = extract(body);
    assert_eq!(verse_text(&records, "matthew", 5, 3), "Blessed are the poor in spirit");
    assert_eq!(verse_text(&records, "matthew", 5, 4), "Blessed are they that mourn");
}

#[test]
fn test_container_text_after_close_is_dropped() {
    let body = r#"<div type="book" osisID="Gen">
<chapter osisID="Gen.1">
<verse osisID="Gen.1.1">In the beginning</verse> trailing text
<verse osisID="Gen.1.2">And the earth</verse>
</chapter>
</div>"#;

    let (records, _) = extract(body);
    assert_eq!(verse_text(&records, "genesis", 1, 1), "In the beginning");
    assert_eq!(verse_text(&records, "genesis", 1, 2), "And the earth");
}

#[test]
fn test_container_verses_out_of_order() {
    let body = r#"<div type="book" osisID="John">
<chapter osisID="John.3">
<verse osisID="John.3.3">three</verse>
<verse osisID="John.3.1">one</verse>
<verse osisID="John.3.2">two</verse>
</chapter>
</div>"#;

    let (records, _) = extract(body);
    let numbers: Vec<u32> = records[0].verses.iter().map(|v| v.verse).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn test_container_with_unknown_book_is_skipped() {
    let body = r#"<div type="book" osisID="Tob">
<chapter osisID="Tob.1">
<verse osisID="Tob.1.1">The book of the words of Tobit</verse>
</chapter>
</div>"#;

    let (records, stats) = extract(body);
    assert!(records.is_empty());
    // book, chapter and verse identifiers
    assert_eq!(stats.unknown_book_signals, 3);
}

#[test]
fn test_mixed_conventions_in_one_document() {
    let body = r#"<div type="book" osisID="Ruth">
<chapter osisID="Ruth.1">
<verse osisID="Ruth.1.1">Now it came to pass</verse>
</chapter>
</div>
<div type="book" osisID="Jonah">
<chapter sID="Jonah.1"/>
<verse sID="Jonah.1.1"/>Now the word of the LORD<verse eID="Jonah.1.1"/>
<chapter eID="Jonah.1"/>
</div>"#;

    let (records, _) = extract(body);
    assert_eq!(records.len(), 2);
    assert_eq!(verse_text(&records, "ruth", 1, 1), "Now it came to pass");
    assert_eq!(verse_text(&records, "jonah", 1, 1), "Now the word of the LORD");
}
