//! Error types for carillon-sync.

use std::path::PathBuf;

use thiserror::Error;

use carillon_core::CoreError;
use carillon_renderer::RenderError;

use crate::transport::TransportError;

/// All errors that can abort a reconciliation run.
///
/// Non-fatal conditions (certificate renewal, per-group operations) never
/// surface here — they are captured in the run report instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the config generator.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An error from the core model or snapshot layer.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The remote registry could not be fetched — a single opaque failure.
    #[error("registry fetch failed: {message}")]
    Registry { message: String },

    /// The supervisor transport failed at the run level (reload).
    #[error("supervisor transport error: {0}")]
    Transport(#[from] TransportError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (hash store).
    #[error("hash store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
