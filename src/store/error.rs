use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or persisting the record document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document does not exist and the missing policy is `fail`.
    #[error("store document {} does not exist", .path.display())]
    Missing { path: PathBuf },

    /// The document exists but is not a JSON mapping of strings.
    #[error("store document {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the updated document failed. Memory was left untouched.
    #[error("failed to persist store document {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the document failed for a reason other than absence.
    #[error("failed to read store document {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
