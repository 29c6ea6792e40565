//! Forward-only node events from an OSIS XML document
//!
//! Wraps `quick_xml::Reader` so that the verse state machine only ever sees
//! element enter/exit and text events, one at a time. The document is never
//! held in memory as a tree.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{ExtractError, Result};

/// Attributes of an element, keyed by local name (namespace prefix dropped).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Attributes(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One step of the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// An element opens. `empty` is set for self-closing elements, which are
    /// always followed directly by their `Exit`.
    Enter {
        name: String,
        attrs: Attributes,
        empty: bool,
    },
    Exit {
        name: String,
    },
    Text(String),
}

impl MarkupEvent {
    pub fn enter(name: &str, attrs: Attributes) -> Self {
        MarkupEvent::Enter { name: name.to_string(), attrs, empty: false }
    }

    pub fn empty(name: &str, attrs: Attributes) -> Self {
        MarkupEvent::Enter { name: name.to_string(), attrs, empty: true }
    }

    pub fn exit(name: &str) -> Self {
        MarkupEvent::Exit { name: name.to_string() }
    }

    pub fn text(text: &str) -> Self {
        MarkupEvent::Text(text.to_string())
    }
}

/// Streaming reader producing [`MarkupEvent`]s
pub struct OsisReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending_exit: Option<String>,
}

impl<'a> OsisReader<&'a [u8]> {
    pub fn from_str(content: &'a str) -> Self {
        OsisReader::new(content.as_bytes())
    }
}

impl OsisReader<Box<dyn BufRead>> {
    /// Open a document from disk.
    ///
    /// UTF-8 (with or without BOM) is streamed. A UTF-16 BOM forces the file
    /// to be transcoded in memory first.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ExtractError::io(path, e))?;
        let mut source = BufReader::new(file);

        let head = source.fill_buf().map_err(|e| ExtractError::io(path, e))?;
        let (encoding, bom_len) = detect_bom(head);

        let boxed: Box<dyn BufRead> = match encoding {
            Some(encoding) => {
                tracing::warn!(
                    "{:?} is {}, decoding the whole file before parsing",
                    path.file_name().unwrap_or_default(),
                    encoding.name()
                );
                let mut bytes = Vec::new();
                source
                    .read_to_end(&mut bytes)
                    .map_err(|e| ExtractError::io(path, e))?;
                let (decoded, _, had_errors) = encoding.decode(&bytes[bom_len..]);
                if had_errors {
                    tracing::warn!("Encoding errors detected while decoding {:?}", path);
                }
                Box::new(Cursor::new(decoded.into_owned().into_bytes()))
            }
            None => {
                source.consume(bom_len);
                Box::new(source)
            }
        };

        Ok(OsisReader::new(boxed))
    }
}

impl<R: BufRead> OsisReader<R> {
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(false);
        reader.expand_empty_elements(false);

        Self {
            reader,
            buf: Vec::new(),
            pending_exit: None,
        }
    }

    /// Byte offset of the reader in the source.
    pub fn position(&self) -> usize {
        self.reader.buffer_position()
    }

    /// Read the next event, `None` at end of document.
    pub fn next_event(&mut self) -> Result<Option<MarkupEvent>> {
        if let Some(name) = self.pending_exit.take() {
            return Ok(Some(MarkupEvent::Exit { name }));
        }

        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf).map_err(|source| ExtractError::Xml {
                position: self.reader.buffer_position(),
                source,
            })?;

            match event {
                Event::Start(ref e) => {
                    return Ok(Some(MarkupEvent::Enter {
                        name: local_name(e),
                        attrs: read_attributes(e),
                        empty: false,
                    }));
                }
                Event::Empty(ref e) => {
                    let name = local_name(e);
                    self.pending_exit = Some(name.clone());
                    return Ok(Some(MarkupEvent::Enter {
                        name,
                        attrs: read_attributes(e),
                        empty: true,
                    }));
                }
                Event::End(ref e) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    return Ok(Some(MarkupEvent::Exit { name }));
                }
                Event::Text(ref e) => {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            tracing::warn!(
                                "Keeping raw text at byte {}: {}",
                                self.reader.buffer_position(),
                                err
                            );
                            String::from_utf8_lossy(e).into_owned()
                        }
                    };
                    if !text.is_empty() {
                        return Ok(Some(MarkupEvent::Text(text)));
                    }
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    if !text.is_empty() {
                        return Ok(Some(MarkupEvent::Text(text)));
                    }
                }
                Event::Eof => return Ok(None),
                // Comments, declarations, processing instructions, doctype
                _ => {}
            }
        }
    }
}

fn local_name(element: &BytesStart) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn read_attributes(element: &BytesStart) -> Attributes {
    element
        .attributes()
        .with_checks(false)
        .filter_map(|a| a.ok())
        .map(|a| {
            let key = String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned();
            let value = match a.unescape_value() {
                Ok(v) => v.into_owned(),
                Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
            };
            (key, value)
        })
        .collect()
}

/// Detect a UTF-16 byte order mark. Returns the encoding to transcode from,
/// if any, and the number of BOM bytes to skip.
fn detect_bom(bytes: &[u8]) -> (Option<&'static Encoding>, usize) {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return (Some(UTF_16LE), 2);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return (Some(UTF_16BE), 2);
    }
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return (None, 3);
    }
    (None, 0)
}
