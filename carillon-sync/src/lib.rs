//! # carillon-sync
//!
//! The reconciliation pipeline: hash-gated atomic artifact writes, topology
//! diffing, supervisor reconciliation in removed→changed→added order, and
//! the top-level [`UpdateOrchestrator`] that sequences one full run.

pub mod diff;
pub mod error;
pub mod hash_store;
pub mod orchestrator;
pub mod reconciler;
pub mod transport;
pub mod writer;

pub use diff::{diff, FileDiff, TopologyDiff};
pub use error::SyncError;
pub use orchestrator::{
    preview, CertOutcome, FetchError, FleetRegistry, PreviewReport, RunReport, UpdateOrchestrator,
};
pub use reconciler::{force_restart, reconcile, GroupFailure, ReconcileReport};
pub use transport::{ReloadOutcome, SocketSupervisor, SupervisorTransport, TransportError};
pub use writer::{write_artifacts, WriteResult};
