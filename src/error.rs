use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort an update cycle before anything is persisted.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response status: {status} at {url}")]
    Status { status: u16, url: String },

    #[error("Empty page returned from {0}")]
    EmptyPage(String),

    /// The page parsed but yielded no companies. Reconciling against that
    /// would age out every stored record, so the cycle stops here.
    #[error("No companies extracted from {0}")]
    EmptySnapshot(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read store {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write store {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Store {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode records: {0}")]
    Encode(#[source] serde_json::Error),
}
