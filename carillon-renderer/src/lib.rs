//! # carillon-renderer
//!
//! Pure config generation: relay definitions in, rendered streaming-server /
//! proxy / supervisor artifacts plus process-group specs out. Templates are
//! embedded at compile time; the only nondeterministic output field is the
//! per-relay source password.

pub mod context;
pub mod engine;
pub mod error;
pub mod password;

pub use context::GeneratorSettings;
pub use engine::{ConfigGenerator, GeneratedConfigSet, StreamConfig};
pub use error::RenderError;
pub use password::generate_password;
