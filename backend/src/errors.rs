use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a whole extraction run.
///
/// Recoverable conditions (unknown book codes, malformed ids, missing
/// lexical keys, unmatched verse ends) are handled where they are detected
/// and only show up in [`crate::types::ExtractStats`].
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parse error at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output error: {0}")]
    Output(String),
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
