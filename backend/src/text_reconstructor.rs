//! Whitespace-correct assembly of verse text from markup fragments
//!
//! Fragments arrive in document order: word text, the text between words,
//! annotated words. Adjacent alphanumeric fragments get a separating space
//! as they are appended; whitespace collapsing and punctuation cleanup only
//! run once the verse is complete, because a word may be split over several
//! fragments.

use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    // Unicode \s covers the no-break space as well
    static ref RE_WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref RE_SPACE_BEFORE_PUNCT: Regex = Regex::new(r"\s+([.,;:!?])").unwrap();
}

/// Accumulation buffer for the text of one open verse.
#[derive(Debug, Clone, Default)]
pub struct VerseText {
    raw: String,
    last_char: Option<char>,
}

impl VerseText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment, separating it from the previous one with a space
    /// when both sides of the junction are alphanumeric. The closing brace of
    /// an annotated word counts as the end of a word.
    pub fn append(&mut self, fragment: &str) {
        let Some(first) = fragment.chars().next() else {
            return;
        };

        if let Some(prev) = self.last_char {
            if (prev.is_alphanumeric() || prev == '}') && first.is_alphanumeric() {
                self.raw.push(' ');
            }
        }

        self.raw.push_str(fragment);
        self.last_char = fragment.chars().last();
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// The raw concatenation, before normalization.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Produce the normalized verse text.
    pub fn finish(&self) -> String {
        normalize_verse_text(&self.raw)
    }
}

/// Collapse whitespace runs, drop spaces before `. , ; : ! ?` and trim.
pub fn normalize_verse_text(raw: &str) -> String {
    let collapsed = RE_WHITESPACE_RUN.replace_all(raw, " ");
    let tightened = RE_SPACE_BEFORE_PUNCT.replace_all(&collapsed, "$1");
    tightened.trim().to_string()
}

/// Assemble a whole sequence of fragments at once.
pub fn reconstruct<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut text = VerseText::new();
    for fragment in fragments {
        text.append(fragment);
    }
    text.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_across_elements_are_separated() {
        assert_eq!(reconstruct(["In the", "beginning", " God"]), "In the beginning God");
        assert_eq!(reconstruct(["for", "God"]), "for God");
    }

    #[test]
    fn test_no_space_before_punctuation() {
        assert_eq!(
            reconstruct(["heaven", " ", ",", " and the earth."]),
            "heaven, and the earth."
        );
        assert_eq!(reconstruct(["Amen", " !"]), "Amen!");
        assert_eq!(reconstruct(["saith", " ", ":", " "]), "saith:");
    }

    #[test]
    fn test_punctuation_fragments_are_not_forced_apart() {
        assert_eq!(reconstruct(["light", ":", "and"]), "light:and");
        assert_eq!(reconstruct(["(", "and", ")"]), "(and)");
    }

    #[test]
    fn test_whitespace_collapse_including_nbsp() {
        assert_eq!(reconstruct(["  In\u{00a0}the \n\t beginning  "]), "In the beginning");
    }

    #[test]
    fn test_empty_fragments_are_ignored() {
        let mut text = VerseText::new();
        text.append("God");
        text.append("");
        text.append("said");
        assert_eq!(text.finish(), "God said");
        assert!(!text.is_empty());
        assert!(VerseText::new().is_empty());
    }

    #[test]
    fn test_annotated_tokens_keep_their_braces() {
        assert_eq!(
            reconstruct(["In", "the", " ", "beginning{H7225}", " ", "God{H430}", "."]),
            "In the beginning{H7225} God{H430}."
        );
        assert_eq!(
            reconstruct(["beginning{H7225}", "God{H430}", "created"]),
            "beginning{H7225} God{H430} created"
        );
    }
}
