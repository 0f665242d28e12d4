//! Error types shared by the import paths.
//!
//! Query and lookup operations never fail loudly: an unknown lexicon or a
//! missing attribute row yields an empty/default value instead. Only imports
//! and attribute-store persistence surface a [`LexiconError`].

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while importing or persisting lexicon data
#[derive(Debug, Error)]
pub enum LexiconError {
    /// The file could not be opened or read
    #[error("Can't open file '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Checksum mismatch or structurally invalid binary graph
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Operation targeted a lexicon name that is not registered
    #[error("unknown lexicon '{0}'")]
    UnknownLexicon(String),

    /// Operation needed the attribute store but none is connected
    #[error("attribute store not connected for lexicon '{0}'")]
    BackendUnavailable(String),

    /// Attribute table could not be encoded or decoded
    #[error("attribute table serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LexiconError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LexiconError::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LexiconError>;
