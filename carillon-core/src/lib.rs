//! Carillon core library — domain types, node environment, snapshots, errors.
//!
//! Public API surface:
//! - [`types`] — relay/fleet model and process-group specs
//! - [`environment`] — explicit node configuration value
//! - [`snapshot`] — local JSON snapshot persistence
//! - [`error`] — [`CoreError`]

pub mod environment;
pub mod error;
pub mod snapshot;
pub mod types;

pub use environment::{env_to_bool, AppEnv, Environment};
pub use error::CoreError;
pub use types::{
    validate_fleet, Mount, ProcessGroupSpec, RelayDefinition, RelayId, RelayType, Shortcode,
};
