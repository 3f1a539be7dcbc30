//! Error kinds returned at each component boundary.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    /// Filesystem read or write failed
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// JSON parsing or serialization failed
    #[error("{context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Capture time could not be formatted
    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    /// No storage override and no home directory to derive one from
    #[error("HOME not set")]
    HomeNotSet,

    /// Hook request was not a usable JSON object
    #[error("invalid hook input: {0}")]
    InvalidRequest(String),
}

impl ExportError {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
