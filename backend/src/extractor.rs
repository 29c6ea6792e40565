//! High-level extraction API
//!
//! Wires the markup reader, the verse segmenter and a chapter sink together
//! for one pass over a document.

use std::path::{Path, PathBuf};
use std::io::BufRead;
use std::time::Instant;

use crate::chapter_writer::{ChapterSink, JsonDirWriter, MemorySink};
use crate::errors::Result;
use crate::logger;
use crate::markup_reader::{MarkupEvent, OsisReader};
use crate::types::{ChapterRecord, ExtractOptions, ExtractStats};
use crate::verse_segmenter::VerseSegmenter;

/// Run the segmenter over an already produced event sequence.
pub fn extract_events<I, S>(events: I, options: &ExtractOptions, sink: S) -> Result<(S, ExtractStats)>
where
    I: IntoIterator<Item = MarkupEvent>,
    S: ChapterSink,
{
    let mut segmenter = VerseSegmenter::new(options, sink);
    for event in events {
        segmenter.handle(event)?;
    }
    segmenter.finish()
}

/// Stream a document through the segmenter.
pub fn extract_from_reader<R, S>(
    mut reader: OsisReader<R>,
    options: &ExtractOptions,
    sink: S,
) -> Result<(S, ExtractStats)>
where
    R: BufRead,
    S: ChapterSink,
{
    let mut segmenter = VerseSegmenter::new(options, sink);
    while let Some(event) = reader.next_event()? {
        segmenter.handle(event)?;
    }
    segmenter.finish()
}

/// Extract an in-memory document into chapter records.
pub fn extract_str(xml: &str, options: &ExtractOptions) -> Result<(Vec<ChapterRecord>, ExtractStats)> {
    let (sink, stats) = extract_from_reader(OsisReader::from_str(xml), options, MemorySink::new())?;
    Ok((sink.records, stats))
}

/// Extract a document on disk into `<out_dir>/<book>/<NN>.json`.
///
/// Nothing is written to `out_dir` unless the whole pass succeeds.
pub fn extract_file_to_dir(input: &Path, out_dir: &Path, options: &ExtractOptions) -> Result<(PathBuf, ExtractStats)> {
    let started = Instant::now();
    logger::info(&format!("Extracting {:?} into {:?}", input, out_dir));
    logger::debug(&format!("Options: {:?}", options));

    let reader = OsisReader::from_path(input)?;
    let writer = JsonDirWriter::create(out_dir, options)?;

    // On error the writer is dropped here and removes its staging directory
    let (writer, stats) = extract_from_reader(reader, options, writer)
        .inspect_err(|e| logger::error(&format!("Extraction of {:?} failed: {}", input, e)))?;
    let out_path = writer.finish()?;

    log_stats(&stats);
    logger::info(&format!(
        "Extraction finished in {}",
        logger::format_duration(started.elapsed())
    ));

    Ok((out_path, stats))
}

pub fn log_stats(stats: &ExtractStats) {
    logger::info(&format!(
        "{} verses in {} chapters, {} empty chapters suppressed",
        stats.verses_emitted, stats.chapters_emitted, stats.empty_chapters_suppressed
    ));

    if stats.skipped_signals() > 0 {
        logger::warn(&format!(
            "Skipped signals: {} unknown book, {} malformed id, {} unmatched verse end, {} duplicate verse start",
            stats.unknown_book_signals,
            stats.malformed_ids,
            stats.unmatched_verse_ends,
            stats.duplicate_verse_starts
        ));
    }
}
