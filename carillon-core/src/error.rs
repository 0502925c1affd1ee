//! Error types for carillon-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from core model and snapshot operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (snapshot files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot file did not exist at the expected path.
    #[error("snapshot not found at {path}")]
    SnapshotNotFound { path: PathBuf },

    /// A relay record violated a per-relay invariant.
    #[error("invalid relay '{shortcode}': {reason}")]
    InvalidRelay { shortcode: String, reason: String },

    /// The fleet as a whole violated a uniqueness invariant.
    #[error("invalid fleet: {reason}")]
    InvalidFleet { reason: String },

    /// A configured base URL could not be parsed or has no host component.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A required configuration value is absent.
    #[error("missing configuration: {name}")]
    MissingConfig { name: &'static str },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
