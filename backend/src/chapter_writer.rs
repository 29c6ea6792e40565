//! Destinations for sealed chapters
//!
//! [`JsonDirWriter`] lays chapters out as `<out>/<book>/<NN>.json`. Files go
//! to a `<out>.partial` staging directory first and only move into `<out>`
//! when the run finishes, so a failed run leaves no half-written output
//! behind. Entries of `<out>` that the run did not produce are kept.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::book_codes::canonical_index;
use crate::errors::{ExtractError, Result};
use crate::types::{ChapterRecord, ExtractOptions};

pub const INDEX_FILENAME: &str = "index.json";

/// Receives each chapter once it is sealed.
pub trait ChapterSink {
    fn emit(&mut self, record: ChapterRecord) -> Result<()>;
}

/// Merge a re-emitted chapter into an earlier record, later text wins.
pub fn merge_chapter(existing: &mut ChapterRecord, incoming: ChapterRecord) {
    let mut verses: BTreeMap<u32, String> = existing
        .verses
        .drain(..)
        .map(|v| (v.verse, v.text))
        .collect();

    for v in incoming.verses {
        verses.insert(v.verse, v.text);
    }

    existing.verses = verses
        .into_iter()
        .map(|(verse, text)| crate::types::VerseRecord { verse, text })
        .collect();
}

/// Collects records in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<ChapterRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChapterSink for MemorySink {
    fn emit(&mut self, record: ChapterRecord) -> Result<()> {
        let existing = self
            .records
            .iter_mut()
            .find(|r| r.book == record.book && r.chapter == record.chapter);

        match existing {
            Some(existing) => merge_chapter(existing, record),
            None => self.records.push(record),
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct IndexEntry<'a> {
    book: &'a str,
    chapters: Vec<u32>,
}

/// Writes one JSON file per chapter.
pub struct JsonDirWriter {
    out_dir: PathBuf,
    staging_dir: PathBuf,
    pretty: bool,
    write_index: bool,
    written: BTreeMap<String, BTreeSet<u32>>,
    finished: bool,
}

impl JsonDirWriter {
    pub fn create(out_dir: &Path, options: &ExtractOptions) -> Result<Self> {
        let staging_dir = staging_dir_for(out_dir)?;

        if staging_dir.exists() {
            tracing::info!("Removing stale staging directory {:?}", staging_dir);
            fs::remove_dir_all(&staging_dir).map_err(|e| ExtractError::io(&staging_dir, e))?;
        }
        fs::create_dir_all(&staging_dir).map_err(|e| ExtractError::io(&staging_dir, e))?;

        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            staging_dir,
            pretty: options.pretty,
            write_index: options.write_index,
            written: BTreeMap::new(),
            finished: false,
        })
    }

    /// Relative path of a chapter file, e.g. `john/03.json`
    pub fn chapter_file_name(book: &str, chapter: u32) -> PathBuf {
        Path::new(book).join(format!("{:02}.json", chapter))
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Number of distinct chapter files written so far
    pub fn chapter_count(&self) -> usize {
        self.written.values().map(|c| c.len()).sum()
    }

    /// Write the index and move the staged output into place.
    ///
    /// Only the book directories and the index produced by this run replace
    /// their counterparts in `out_dir`. Other entries there are left alone.
    pub fn finish(mut self) -> Result<PathBuf> {
        if self.write_index {
            self.write_index_file()?;
        }

        fs::create_dir_all(&self.out_dir).map_err(|e| ExtractError::io(&self.out_dir, e))?;

        for book in self.written.keys() {
            replace_entry(&self.staging_dir.join(book), &self.out_dir.join(book))?;
        }
        if self.write_index {
            replace_entry(
                &self.staging_dir.join(INDEX_FILENAME),
                &self.out_dir.join(INDEX_FILENAME),
            )?;
        }

        fs::remove_dir_all(&self.staging_dir).map_err(|e| ExtractError::io(&self.staging_dir, e))?;

        self.finished = true;
        tracing::info!(
            "Wrote {} chapter files into {:?}",
            self.chapter_count(),
            self.out_dir
        );
        Ok(self.out_dir.clone())
    }

    fn write_index_file(&self) -> Result<()> {
        let mut entries: Vec<IndexEntry> = self
            .written
            .iter()
            .map(|(book, chapters)| IndexEntry {
                book: book.as_str(),
                chapters: chapters.iter().copied().collect(),
            })
            .collect();
        entries.sort_by(|a, b| {
            canonical_index(a.book)
                .cmp(&canonical_index(b.book))
                .then_with(|| a.book.cmp(b.book))
        });

        let path = self.staging_dir.join(INDEX_FILENAME);
        self.write_json(&path, &entries)
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let content = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        fs::write(path, content).map_err(|e| ExtractError::io(path, e))
    }
}

impl ChapterSink for JsonDirWriter {
    fn emit(&mut self, mut record: ChapterRecord) -> Result<()> {
        let rel_path = Self::chapter_file_name(&record.book, record.chapter);
        let path = self.staging_dir.join(&rel_path);

        if let Some(book_dir) = path.parent() {
            fs::create_dir_all(book_dir).map_err(|e| ExtractError::io(book_dir, e))?;
        }

        let seen = self
            .written
            .get(&record.book)
            .is_some_and(|chapters| chapters.contains(&record.chapter));

        if seen {
            tracing::warn!("Chapter {:?} emitted twice, merging verses", rel_path);
            let content = fs::read_to_string(&path).map_err(|e| ExtractError::io(&path, e))?;
            let mut existing: ChapterRecord = serde_json::from_str(&content)?;
            merge_chapter(&mut existing, record);
            record = existing;
        }

        self.write_json(&path, &record)?;
        self.written
            .entry(record.book.clone())
            .or_default()
            .insert(record.chapter);
        Ok(())
    }
}

impl Drop for JsonDirWriter {
    fn drop(&mut self) {
        if !self.finished && self.staging_dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.staging_dir) {
                tracing::error!("Failed to remove staging directory {:?}: {}", self.staging_dir, e);
            }
        }
    }
}

/// Move a staged file or directory over `target`, removing what was there.
fn replace_entry(staged: &Path, target: &Path) -> Result<()> {
    if target.is_dir() {
        fs::remove_dir_all(target).map_err(|e| ExtractError::io(target, e))?;
    } else if target.exists() {
        fs::remove_file(target).map_err(|e| ExtractError::io(target, e))?;
    }
    fs::rename(staged, target).map_err(|e| ExtractError::io(target, e))
}

fn staging_dir_for(out_dir: &Path) -> Result<PathBuf> {
    let name = out_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExtractError::Output(format!("Invalid output directory: {:?}", out_dir)))?;
    Ok(out_dir.with_file_name(format!("{}.partial", name)))
}
