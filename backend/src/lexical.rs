//! Inline lexical keys (Strong's numbers) on word nodes
//!
//! `<w lemma="strong:H07225">beginning</w>` becomes `beginning{H7225}`.

use std::fmt;

use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    // strong:H07225, x-Strongs:G3056, lemma.TR:... is ignored
    static ref RE_LEXICAL_KEY: Regex = Regex::new(r"(?i)[a-z][\w.-]*:([hg])(\d+)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexicalDomain {
    Hebrew,
    Greek,
}

impl LexicalDomain {
    pub fn marker(&self) -> char {
        match self {
            LexicalDomain::Hebrew => 'H',
            LexicalDomain::Greek => 'G',
        }
    }
}

/// A domain letter plus a number without leading zeros, e.g. `H7225`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LexicalKey {
    pub domain: LexicalDomain,
    pub number: u32,
}

impl fmt::Display for LexicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.domain.marker(), self.number)
    }
}

/// Find the first lexical key in a free-text attribute value.
///
/// A missing attribute, a value without a key, or a number too large to
/// represent all yield `None`.
pub fn extract_lexical_key(attr_value: Option<&str>) -> Option<LexicalKey> {
    let value = attr_value?;

    RE_LEXICAL_KEY.captures_iter(value).find_map(|caps| {
        let domain = match caps[1].to_ascii_uppercase().as_str() {
            "H" => LexicalDomain::Hebrew,
            _ => LexicalDomain::Greek,
        };
        let number = caps[2].parse::<u32>().ok()?;
        Some(LexicalKey { domain, number })
    })
}

/// Format a word with its key, `word{KEY}`, or return it unchanged.
///
/// Whitespace around the word stays outside the braces so that the
/// annotation sticks to the word itself.
pub fn annotate(word: &str, key: Option<&LexicalKey>) -> String {
    let Some(key) = key else {
        return word.to_string();
    };

    let core = word.trim();
    if core.is_empty() {
        return word.to_string();
    }

    let lead_len = word.len() - word.trim_start().len();
    let lead = &word[..lead_len];
    let trail = &word[lead_len + core.len()..];

    format!("{}{}{{{}}}{}", lead, core, key, trail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_strips_zero_padding() {
        let key = extract_lexical_key(Some("strong:H07225")).unwrap();
        assert_eq!(key.domain, LexicalDomain::Hebrew);
        assert_eq!(key.number, 7225);
        assert_eq!(key.to_string(), "H7225");
    }

    #[test]
    fn test_extract_first_key_and_case() {
        let key = extract_lexical_key(Some("lemma.TR:logos strong:g3056 strong:G2316")).unwrap();
        assert_eq!(key.to_string(), "G3056");
    }

    #[test]
    fn test_extract_absent_or_malformed() {
        assert_eq!(extract_lexical_key(None), None);
        assert_eq!(extract_lexical_key(Some("")), None);
        assert_eq!(extract_lexical_key(Some("strong:X123")), None);
        assert_eq!(extract_lexical_key(Some("strong:H")), None);
        assert_eq!(extract_lexical_key(Some("H7225")), None);
        assert_eq!(extract_lexical_key(Some("strong:H99999999999999")), None);
    }

    #[test]
    fn test_annotate() {
        let key = extract_lexical_key(Some("strong:H07225"));
        assert_eq!(annotate("beginning", key.as_ref()), "beginning{H7225}");
        assert_eq!(annotate(" beginning ", key.as_ref()), " beginning{H7225} ");
        assert_eq!(annotate("beginning", None), "beginning");
        assert_eq!(annotate("  ", key.as_ref()), "  ");
    }
}
