use serde::{Serialize, Deserialize};

/// A fully resolved verse location, e.g. `John.3.16` → ("john", 3, 16)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseAddress {
    pub book: &'static str,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseAddress {
    pub fn chapter_address(&self) -> ChapterAddress {
        ChapterAddress {
            book: self.book,
            chapter: self.chapter,
        }
    }
}

/// A chapter location, e.g. `John.3` → ("john", 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChapterAddress {
    pub book: &'static str,
    pub chapter: u32,
}

/// One verse as it appears in the output, `{ "v": 1, "t": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    #[serde(rename = "v")]
    pub verse: u32,
    #[serde(rename = "t")]
    pub text: String,
}

/// A sealed chapter with its verses in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub book: String,
    pub chapter: u32,
    pub verses: Vec<VerseRecord>,
}

/// Knobs for one extraction run.
///
/// The CLI fills this from flags and environment variables, library callers
/// usually start from `ExtractOptions::default()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Append `{H7225}`-style lexical keys to annotated words.
    pub annotate_lexical: bool,
    /// Emit chapters that were opened and closed without any verse.
    pub emit_empty_chapters: bool,
    /// Write `index.json` next to the chapter files.
    pub write_index: bool,
    /// Indent the JSON output.
    pub pretty: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            annotate_lexical: true,
            emit_empty_chapters: false,
            write_index: true,
            pretty: true,
        }
    }
}

/// Counters collected during one pass over a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    pub verses_emitted: usize,
    pub chapters_emitted: usize,
    pub empty_chapters_suppressed: usize,
    pub unknown_book_signals: usize,
    pub malformed_ids: usize,
    pub unmatched_verse_ends: usize,
    pub duplicate_verse_starts: usize,
}

impl ExtractStats {
    /// Number of boundary signals that were dropped as recoverable errors.
    pub fn skipped_signals(&self) -> usize {
        self.unknown_book_signals
            + self.malformed_ids
            + self.unmatched_verse_ends
            + self.duplicate_verse_starts
    }
}
