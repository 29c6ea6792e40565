pub mod types;
pub mod errors;
pub mod logger;
pub mod book_codes;
pub mod markup_reader;
pub mod markup_filter;
pub mod text_reconstructor;
pub mod lexical;
pub mod verse_segmenter;
pub mod chapter_aggregator;
pub mod chapter_writer;
pub mod extractor;

pub use errors::{ExtractError, Result};
pub use extractor::{extract_events, extract_file_to_dir, extract_from_reader, extract_str};
pub use types::{ChapterRecord, ExtractOptions, ExtractStats, VerseRecord};

/// Directories searched for the source document when none is given
pub static DEFAULT_SEARCH_DIRS: &[&str] = &["downloads/kjv2006", "downloads/strongs_text", "downloads"];

/// Default output directory for chapter files
pub static DEFAULT_OUTPUT_DIR: &str = "data/bible/KJV";
