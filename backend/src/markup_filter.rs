//! Per-element classification of OSIS markup
//!
//! Decides whether an element carries verse text, is a word that may hold a
//! lexical key, is editorial content to drop, or marks a book, chapter or
//! verse boundary. Anything unknown passes through.

use crate::markup_reader::Attributes;

/// Attribute carrying lexical keys on word elements
pub const LEXICAL_ATTR: &str = "lemma";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    Book,
    Chapter,
    Verse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// A word element without a lexical key
    ContentWord,
    /// A word element with a lexical attribute
    AnnotationHost,
    /// Footnotes and cross-reference notes, inner text is dropped
    ExcludedNote,
    StructuralBoundary(Structure),
    /// Everything else; its text still reaches the verse
    Passthrough,
}

impl NodeClass {
    pub fn is_word(&self) -> bool {
        matches!(self, NodeClass::ContentWord | NodeClass::AnnotationHost)
    }
}

/// Classify by element name and word-level flag alone.
///
/// Never returns `AnnotationHost`: telling a lexical host from a plain word
/// needs the attributes, see [`classify_element`].
pub fn classify(name: &str, is_word_level: bool) -> NodeClass {
    if name.eq_ignore_ascii_case("note") {
        return NodeClass::ExcludedNote;
    }
    if name.eq_ignore_ascii_case("verse") {
        return NodeClass::StructuralBoundary(Structure::Verse);
    }
    if name.eq_ignore_ascii_case("chapter") {
        return NodeClass::StructuralBoundary(Structure::Chapter);
    }
    if is_word_level {
        return NodeClass::ContentWord;
    }
    NodeClass::Passthrough
}

/// Classify an element using its attributes.
///
/// `<w lemma="...">` hosts an annotation, and a `div` is a book boundary when
/// it says `type="book"` or its osisID is a bare book code.
pub fn classify_element(name: &str, attrs: &Attributes) -> NodeClass {
    let is_word_level = name.eq_ignore_ascii_case("w");

    match classify(name, is_word_level) {
        NodeClass::ContentWord if attrs.contains(LEXICAL_ATTR) => NodeClass::AnnotationHost,
        NodeClass::Passthrough if name.eq_ignore_ascii_case("div") && is_book_div(attrs) => {
            NodeClass::StructuralBoundary(Structure::Book)
        }
        class => class,
    }
}

fn is_book_div(attrs: &Attributes) -> bool {
    match (attrs.get("type"), attrs.get("osisID")) {
        (Some(div_type), _) => div_type == "book",
        (None, Some(id)) => !id.trim().is_empty() && !id.contains('.'),
        (None, None) => false,
    }
}
