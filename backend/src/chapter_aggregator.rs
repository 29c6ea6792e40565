//! Buffers completed verses per (book, chapter) until the chapter is sealed

use std::collections::{BTreeMap, BTreeSet};

use crate::chapter_writer::ChapterSink;
use crate::errors::Result;
use crate::types::{ChapterAddress, ChapterRecord, ExtractStats, VerseAddress, VerseRecord};

pub struct ChapterAggregator<S: ChapterSink> {
    sink: S,
    open: BTreeMap<ChapterAddress, BTreeMap<u32, String>>,
    /// Verse numbers already handed to the sink, per chapter
    emitted: BTreeMap<ChapterAddress, BTreeSet<u32>>,
    emit_empty_chapters: bool,
    stats: ExtractStats,
}

impl<S: ChapterSink> ChapterAggregator<S> {
    pub fn new(sink: S, emit_empty_chapters: bool) -> Self {
        Self {
            sink,
            open: BTreeMap::new(),
            emitted: BTreeMap::new(),
            emit_empty_chapters,
            stats: ExtractStats::default(),
        }
    }

    /// Start collecting a chapter that the source opened explicitly.
    pub fn open_chapter(&mut self, chapter: ChapterAddress) {
        self.open.entry(chapter).or_default();
    }

    pub fn is_open(&self, chapter: &ChapterAddress) -> bool {
        self.open.contains_key(chapter)
    }

    /// Store a completed verse. Returns `true` when it replaced an earlier
    /// verse with the same address.
    pub fn add_verse(&mut self, address: &VerseAddress, text: String) -> bool {
        self.open
            .entry(address.chapter_address())
            .or_default()
            .insert(address.verse, text)
            .is_some()
    }

    /// Seal one chapter and hand it to the sink. Unknown chapters are ignored.
    pub fn seal(&mut self, chapter: &ChapterAddress) -> Result<()> {
        let Some(verses) = self.open.remove(chapter) else {
            return Ok(());
        };

        if verses.is_empty() && !self.emit_empty_chapters {
            tracing::debug!("Suppressing empty chapter {} {}", chapter.book, chapter.chapter);
            self.stats.empty_chapters_suppressed += 1;
            return Ok(());
        }

        // A chapter sealed again after more verses arrived is merged by the
        // sink, so only new chapters and verse numbers are counted
        let seen = self.emitted.contains_key(chapter);
        let numbers = self.emitted.entry(*chapter).or_default();
        let new_verses = verses.keys().filter(|v| numbers.insert(**v)).count();
        if !seen {
            self.stats.chapters_emitted += 1;
        }
        self.stats.verses_emitted += new_verses;

        self.sink.emit(build_record(chapter, verses))
    }

    /// Seal every open chapter of a book.
    pub fn seal_book(&mut self, book: &str) -> Result<()> {
        let chapters: Vec<ChapterAddress> = self
            .open
            .keys()
            .filter(|c| c.book == book)
            .copied()
            .collect();

        for chapter in chapters {
            self.seal(&chapter)?;
        }
        Ok(())
    }

    /// Seal everything still open, at end of document.
    pub fn seal_all(&mut self) -> Result<()> {
        let chapters: Vec<ChapterAddress> = self.open.keys().copied().collect();
        for chapter in chapters {
            self.seal(&chapter)?;
        }
        Ok(())
    }

    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

fn build_record(chapter: &ChapterAddress, verses: BTreeMap<u32, String>) -> ChapterRecord {
    let mut verses: Vec<VerseRecord> = verses
        .into_iter()
        .map(|(verse, text)| VerseRecord { verse, text })
        .collect();
    // BTreeMap order is already ascending, keep the guarantee explicit
    verses.sort_by_key(|v| v.verse);

    ChapterRecord {
        book: chapter.book.to_string(),
        chapter: chapter.chapter,
        verses,
    }
}
