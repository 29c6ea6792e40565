//! Verse boundary state machine
//!
//! Consumes [`MarkupEvent`]s and decides where verses start and end, for both
//! boundary conventions found in OSIS files:
//!
//! - milestones: `<verse sID="Gen.1.1"/> ... <verse eID="Gen.1.1"/>`, where
//!   the markers are not containers and chapters may open or close between
//!   them;
//! - containers: `<verse osisID="Gen.1.1"> ... </verse>`.
//!
//! Both are reduced to a [`VerseSignal`] and handled in one place. Chapters
//! and books are tracked the same way one level up, sealing chapters into the
//! [`ChapterAggregator`] as soon as no more verses can arrive for them.
//!
//! Memory is bounded by the element nesting depth plus the text of the open
//! verse and of the chapters not yet sealed.

use std::collections::HashSet;

use crate::book_codes::{parse_book_id, parse_chapter_id, parse_verse_id, IdRejection};
use crate::chapter_aggregator::ChapterAggregator;
use crate::chapter_writer::ChapterSink;
use crate::errors::Result;
use crate::lexical::{annotate, extract_lexical_key, LexicalKey};
use crate::markup_filter::{classify_element, NodeClass, Structure, LEXICAL_ATTR};
use crate::markup_reader::{Attributes, MarkupEvent};
use crate::text_reconstructor::VerseText;
use crate::types::{ChapterAddress, ExtractOptions, ExtractStats, VerseAddress};

/// A verse boundary, independent of the markup convention that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerseSignal {
    /// `id` gives the address, `token` is what the end milestone repeats
    MilestoneStart { id: String, token: String },
    MilestoneEnd { id: String },
    ContainerOpen { id: String, depth: usize },
    ContainerClose { depth: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChapterSignal {
    Start { id: String },
    End { id: String },
    ContainerClose(ChapterAddress),
}

/// What an open element contributes while it is on the stack
#[derive(Debug)]
enum FrameRole {
    Plain,
    Note,
    Word {
        text: String,
        key: Option<LexicalKey>,
    },
    ContainerVerse,
    ContainerChapter(ChapterAddress),
    Book(&'static str),
}

#[derive(Debug)]
struct Frame {
    name: String,
    role: FrameRole,
}

#[derive(Debug)]
struct OpenVerse {
    address: VerseAddress,
    /// Identifier of the start milestone, matched against the end milestone
    start_id: Option<String>,
    /// Stack depth of the enclosing `<verse>` element for containers
    container_depth: Option<usize>,
    text: VerseText,
}

pub struct VerseSegmenter<S: ChapterSink> {
    annotate_lexical: bool,
    aggregator: ChapterAggregator<S>,
    stack: Vec<Frame>,
    notes_open: usize,
    open_verse: Option<OpenVerse>,
    current_book: Option<&'static str>,
    current_chapter: Option<ChapterAddress>,
    /// Chapters whose end was seen while one of their verses was still open
    deferred_seals: HashSet<ChapterAddress>,
    stats: ExtractStats,
}

impl<S: ChapterSink> VerseSegmenter<S> {
    pub fn new(options: &ExtractOptions, sink: S) -> Self {
        Self {
            annotate_lexical: options.annotate_lexical,
            aggregator: ChapterAggregator::new(sink, options.emit_empty_chapters),
            stack: Vec::new(),
            notes_open: 0,
            open_verse: None,
            current_book: None,
            current_chapter: None,
            deferred_seals: HashSet::new(),
            stats: ExtractStats::default(),
        }
    }

    /// Address of the verse currently collecting text, if any.
    pub fn open_verse(&self) -> Option<&VerseAddress> {
        self.open_verse.as_ref().map(|v| &v.address)
    }

    pub fn current_book(&self) -> Option<&'static str> {
        self.current_book
    }

    pub fn handle(&mut self, event: MarkupEvent) -> Result<()> {
        match event {
            MarkupEvent::Enter { name, attrs, empty } => self.enter(name, &attrs, empty),
            MarkupEvent::Exit { name } => self.exit(&name),
            MarkupEvent::Text(text) => {
                self.text(&text);
                Ok(())
            }
        }
    }

    /// End of document: flush whatever is still open.
    pub fn finish(mut self) -> Result<(S, ExtractStats)> {
        if let Some(verse) = &self.open_verse {
            tracing::debug!("Verse {:?} still open at end of document", verse.address);
        }
        self.flush_verse()?;
        self.aggregator.seal_all()?;

        let mut stats = self.stats;
        let agg_stats = self.aggregator.stats();
        stats.verses_emitted = agg_stats.verses_emitted;
        stats.chapters_emitted = agg_stats.chapters_emitted;
        stats.empty_chapters_suppressed = agg_stats.empty_chapters_suppressed;

        Ok((self.aggregator.into_sink(), stats))
    }

    fn enter(&mut self, name: String, attrs: &Attributes, empty: bool) -> Result<()> {
        let depth = self.stack.len();

        let role = match classify_element(&name, attrs) {
            NodeClass::ExcludedNote => {
                self.notes_open += 1;
                FrameRole::Note
            }
            NodeClass::ContentWord | NodeClass::AnnotationHost => FrameRole::Word {
                text: String::new(),
                key: extract_lexical_key(attrs.get(LEXICAL_ATTR)),
            },
            NodeClass::StructuralBoundary(Structure::Verse) => {
                match verse_signal(attrs, empty, depth) {
                    Some(signal) => {
                        let is_container = matches!(signal, VerseSignal::ContainerOpen { .. });
                        self.handle_verse_signal(signal)?;
                        if is_container {
                            FrameRole::ContainerVerse
                        } else {
                            FrameRole::Plain
                        }
                    }
                    None => FrameRole::Plain,
                }
            }
            NodeClass::StructuralBoundary(Structure::Chapter) => {
                match chapter_signal(attrs, empty) {
                    Some((signal, container)) => {
                        let opened = self.handle_chapter_signal(signal)?;
                        match (container, opened) {
                            (true, Some(chapter)) => FrameRole::ContainerChapter(chapter),
                            _ => FrameRole::Plain,
                        }
                    }
                    None => FrameRole::Plain,
                }
            }
            NodeClass::StructuralBoundary(Structure::Book) => self.enter_book(attrs)?,
            NodeClass::Passthrough => FrameRole::Plain,
        };

        self.stack.push(Frame { name, role });
        Ok(())
    }

    fn exit(&mut self, name: &str) -> Result<()> {
        let Some(frame) = self.stack.pop() else {
            tracing::debug!("Closing </{}> with no open element", name);
            return Ok(());
        };
        let depth = self.stack.len();

        match frame.role {
            FrameRole::Plain => {}
            FrameRole::Note => {
                self.notes_open = self.notes_open.saturating_sub(1);
            }
            FrameRole::Word { text, key } => self.exit_word(text, key),
            FrameRole::ContainerVerse => {
                self.handle_verse_signal(VerseSignal::ContainerClose { depth })?;
            }
            FrameRole::ContainerChapter(chapter) => {
                self.handle_chapter_signal(ChapterSignal::ContainerClose(chapter))?;
            }
            FrameRole::Book(book) => self.close_book(book)?,
        }

        if frame.name != name {
            tracing::debug!("Mismatched close </{}> for <{}>", name, frame.name);
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.notes_open > 0 || self.open_verse.is_none() {
            return;
        }

        if let Some(word) = self.innermost_word() {
            word.push_str(text);
        } else if let Some(verse) = self.open_verse.as_mut() {
            verse.text.append(text);
        }
    }

    fn exit_word(&mut self, text: String, key: Option<LexicalKey>) {
        if self.notes_open > 0 || self.open_verse.is_none() || text.is_empty() {
            return;
        }

        let fragment = if self.annotate_lexical {
            annotate(&text, key.as_ref())
        } else {
            text
        };

        // A word nested in another word belongs to the outer one
        if let Some(outer) = self.innermost_word() {
            outer.push_str(&fragment);
        } else if let Some(verse) = self.open_verse.as_mut() {
            verse.text.append(&fragment);
        }
    }

    fn innermost_word(&mut self) -> Option<&mut String> {
        self.stack.iter_mut().rev().find_map(|frame| match &mut frame.role {
            FrameRole::Word { text, .. } => Some(text),
            _ => None,
        })
    }

    fn handle_verse_signal(&mut self, signal: VerseSignal) -> Result<()> {
        match signal {
            VerseSignal::MilestoneStart { id, token } => self.start_verse(&id, Some(token), None),
            VerseSignal::ContainerOpen { id, depth } => self.start_verse(&id, None, Some(depth)),
            VerseSignal::MilestoneEnd { id } => {
                let matches = self.open_verse.as_ref().is_some_and(|open| {
                    open.start_id.as_deref() == Some(id.as_str())
                        || parse_verse_id(&id).is_ok_and(|address| address == open.address)
                });

                if matches {
                    self.flush_verse()
                } else {
                    tracing::debug!("Ignoring verse end {:?} with no matching open verse", id);
                    self.stats.unmatched_verse_ends += 1;
                    Ok(())
                }
            }
            VerseSignal::ContainerClose { depth } => {
                let matches = self
                    .open_verse
                    .as_ref()
                    .is_some_and(|open| open.container_depth == Some(depth));

                if matches {
                    self.flush_verse()
                } else {
                    Ok(())
                }
            }
        }
    }

    fn start_verse(
        &mut self,
        id: &str,
        start_id: Option<String>,
        container_depth: Option<usize>,
    ) -> Result<()> {
        let address = match parse_verse_id(id) {
            Ok(address) => address,
            Err(rejection) => {
                self.count_rejection(&rejection, id);
                return Ok(());
            }
        };

        if let Some(open) = self.open_verse.as_mut() {
            if open.address == address {
                tracing::debug!("Verse {:?} started again while open, restarting its text", address);
                open.text = VerseText::new();
                self.stats.duplicate_verse_starts += 1;
                return Ok(());
            }
            tracing::debug!(
                "Verse {:?} started while {:?} was open, closing the earlier one",
                address,
                open.address
            );
            self.flush_verse()?;
        }

        self.open_verse = Some(OpenVerse {
            address,
            start_id,
            container_depth,
            text: VerseText::new(),
        });
        Ok(())
    }

    fn flush_verse(&mut self) -> Result<()> {
        let Some(verse) = self.open_verse.take() else {
            return Ok(());
        };

        let text = verse.text.finish();
        if self.aggregator.add_verse(&verse.address, text) {
            tracing::debug!("Verse {:?} emitted twice, keeping the later text", verse.address);
        }

        let chapter = verse.address.chapter_address();
        if self.deferred_seals.remove(&chapter) {
            self.aggregator.seal(&chapter)?;
        }
        Ok(())
    }

    /// Returns the chapter that was opened, if the signal opened one.
    fn handle_chapter_signal(&mut self, signal: ChapterSignal) -> Result<Option<ChapterAddress>> {
        match signal {
            ChapterSignal::Start { id } => {
                let chapter = match parse_chapter_id(&id) {
                    Ok(chapter) => chapter,
                    Err(rejection) => {
                        self.count_rejection(&rejection, &id);
                        return Ok(None);
                    }
                };

                if let Some(previous) = self.current_chapter {
                    if previous != chapter {
                        self.seal_chapter(previous)?;
                    }
                }
                self.aggregator.open_chapter(chapter);
                self.current_chapter = Some(chapter);
                Ok(Some(chapter))
            }
            ChapterSignal::End { id } => {
                match parse_chapter_id(&id) {
                    Ok(chapter) => self.seal_chapter(chapter)?,
                    Err(rejection) => self.count_rejection(&rejection, &id),
                }
                Ok(None)
            }
            ChapterSignal::ContainerClose(chapter) => {
                self.seal_chapter(chapter)?;
                Ok(None)
            }
        }
    }

    fn seal_chapter(&mut self, chapter: ChapterAddress) -> Result<()> {
        if self.current_chapter == Some(chapter) {
            self.current_chapter = None;
        }

        let verse_still_open = self
            .open_verse
            .as_ref()
            .is_some_and(|open| open.address.chapter_address() == chapter);

        if verse_still_open {
            self.deferred_seals.insert(chapter);
            Ok(())
        } else {
            self.aggregator.seal(&chapter)
        }
    }

    fn enter_book(&mut self, attrs: &Attributes) -> Result<FrameRole> {
        // Milestone book ends carry only eID
        if let Some(id) = attrs.get("eID") {
            if let Ok(book) = parse_book_id(id) {
                self.close_book(book)?;
            }
            return Ok(FrameRole::Plain);
        }

        let Some(id) = attrs.get("osisID").or_else(|| attrs.get("sID")) else {
            return Ok(FrameRole::Plain);
        };

        match parse_book_id(id) {
            Ok(book) => {
                if let Some(previous) = self.current_book {
                    if previous != book {
                        self.close_book(previous)?;
                    }
                }
                self.current_book = Some(book);
                // A milestone book has no matching close element
                if attrs.contains("sID") {
                    Ok(FrameRole::Plain)
                } else {
                    Ok(FrameRole::Book(book))
                }
            }
            Err(rejection) => {
                self.count_rejection(&rejection, id);
                Ok(FrameRole::Plain)
            }
        }
    }

    fn close_book(&mut self, book: &'static str) -> Result<()> {
        if self.open_verse.as_ref().is_some_and(|v| v.address.book == book) {
            tracing::debug!("Book {} closed with a verse still open", book);
            self.flush_verse()?;
        }

        self.deferred_seals.retain(|c| c.book != book);
        if self.current_chapter.is_some_and(|c| c.book == book) {
            self.current_chapter = None;
        }
        if self.current_book == Some(book) {
            self.current_book = None;
        }

        self.aggregator.seal_book(book)
    }

    fn count_rejection(&mut self, rejection: &IdRejection, id: &str) {
        match rejection {
            IdRejection::UnknownBook => {
                tracing::debug!("Skipping {:?}: unknown book code", id);
                self.stats.unknown_book_signals += 1;
            }
            IdRejection::Malformed => {
                tracing::debug!("Skipping malformed identifier {:?}", id);
                self.stats.malformed_ids += 1;
            }
        }
    }
}

/// Reduce a `<verse>` element to a boundary signal.
///
/// `sID`/`eID` mark milestones. A bare `osisID` is a container, unless the
/// element is self-closing, in which case it is read as a start milestone.
fn verse_signal(attrs: &Attributes, empty: bool, depth: usize) -> Option<VerseSignal> {
    if let Some(id) = attrs.get("eID") {
        return Some(VerseSignal::MilestoneEnd { id: id.to_string() });
    }

    if let Some(sid) = attrs.get("sID") {
        // sID may carry a generated suffix, osisID is the cleaner address
        let id = attrs.get("osisID").unwrap_or(sid);
        return Some(VerseSignal::MilestoneStart {
            id: id.to_string(),
            token: sid.to_string(),
        });
    }

    let id = attrs.get("osisID")?.to_string();
    if empty {
        Some(VerseSignal::MilestoneStart { token: id.clone(), id })
    } else {
        Some(VerseSignal::ContainerOpen { id, depth })
    }
}

/// Reduce a `<chapter>` element to a signal, flagging containers.
fn chapter_signal(attrs: &Attributes, empty: bool) -> Option<(ChapterSignal, bool)> {
    if let Some(id) = attrs.get("eID") {
        return Some((ChapterSignal::End { id: id.to_string() }, false));
    }
    if let Some(sid) = attrs.get("sID") {
        let id = attrs.get("osisID").unwrap_or(sid);
        return Some((ChapterSignal::Start { id: id.to_string() }, false));
    }
    let id = attrs.get("osisID")?;
    Some((ChapterSignal::Start { id: id.to_string() }, !empty))
}
