//! Error types for carillon-acme.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::EngineError;

/// All errors that can arise from certificate lifecycle operations.
#[derive(Debug, Error)]
pub enum AcmeError {
    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external ACME engine reported a failure.
    #[error("ACME engine error: {0}")]
    Engine(#[from] EngineError),

    /// A challenge token did not reduce to a usable file name.
    #[error("invalid challenge token '{token}'")]
    InvalidToken { token: String },
}

/// Convenience constructor for [`AcmeError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> AcmeError {
    AcmeError::Io {
        path: path.into(),
        source,
    }
}
