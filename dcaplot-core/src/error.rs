//! Error types for dcaplot-core.

use std::path::PathBuf;

use dcaplot_types::{RecordId, WireAction};
use thiserror::Error;

/// Result type for action sink operations.
pub type SinkResult<T = ()> = Result<T, SinkError>;

/// Why an action did not reach the surface.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("sink disconnected")]
    Disconnected,

    #[error("surface rejected {action}: {reason}")]
    Rejected { action: WireAction, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for show file operations.
pub type ShowResult<T> = Result<T, ShowError>;

/// Errors loading or saving a show file.
#[derive(Error, Debug)]
pub enum ShowError {
    #[error("Failed to read file: {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported show file version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Record {0} appears more than once")]
    DuplicateRecord(RecordId),
}
