//! Error types for carillon-renderer.

use thiserror::Error;

use carillon_core::CoreError;

/// All errors that can arise while generating the config set.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template compilation, context serialization or rendering failure.
    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    /// The relay set violated a model invariant.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}
