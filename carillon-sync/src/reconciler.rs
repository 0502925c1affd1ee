//! Applies a [`TopologyDiff`] against the supervisor in a safe order.
//!
//! The supervisor has no transactional semantics; partial application must
//! leave a consistent subset running. Phase order is therefore strict:
//! removed first, then changed, then added — and each phase is processed
//! fully before the next begins.

use carillon_core::ProcessGroupSpec;

use crate::diff::TopologyDiff;
use crate::transport::{SupervisorTransport, TransportError};

/// One failed supervisor operation, recorded without aborting the phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    pub group: String,
    pub operation: &'static str,
    pub message: String,
}

/// What a reconcile pass touched and what went wrong while touching it.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Every group an operation was attempted on, in application order,
    /// regardless of per-step outcome.
    pub affected: Vec<String>,
    pub failures: Vec<GroupFailure>,
}

impl ReconcileReport {
    fn record(&mut self, group: &str, operation: &'static str, result: Result<(), TransportError>) {
        if let Err(err) = result {
            tracing::warn!("{operation} failed for group '{group}': {err}");
            self.failures.push(GroupFailure {
                group: group.to_string(),
                operation,
                message: err.to_string(),
            });
        }
    }
}

/// Apply `diff` phase by phase. One failing group never blocks the remaining
/// groups in its phase; all failures surface in the report.
pub fn reconcile(transport: &mut dyn SupervisorTransport, diff: &TopologyDiff) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    if !diff.removed.is_empty() {
        tracing::debug!("removing {} supervisor group(s)", diff.removed.len());
        for group in &diff.removed {
            report.affected.push(group.clone());
            // Stop may legitimately fail (group already stopped or absent);
            // removal is the authoritative terminal action either way.
            report.record(group, "stop", transport.stop_process_group(group));
            report.record(group, "remove", transport.remove_process_group(group));
        }
    }

    if !diff.changed.is_empty() {
        tracing::debug!("reloading {} modified supervisor group(s)", diff.changed.len());
        for spec in &diff.changed {
            let group = &spec.group_name;
            report.affected.push(group.clone());
            // The program definition itself changed; a bare reload would keep
            // running the old command line.
            report.record(group, "stop", transport.stop_process_group(group));
            report.record(group, "remove", transport.remove_process_group(group));
            report.record(group, "add", transport.add_process_group(group));
        }
    }

    if !diff.added.is_empty() {
        tracing::debug!("adding {} new supervisor group(s)", diff.added.len());
        for spec in &diff.added {
            let group = &spec.group_name;
            report.affected.push(group.clone());
            report.record(group, "add", transport.add_process_group(group));
        }
    }

    report
}

/// Broad restart: TERM every generated program and let the supervisor's
/// autorestart bring it back with the freshly written config.
pub fn force_restart(
    transport: &mut dyn SupervisorTransport,
    groups: &[ProcessGroupSpec],
) -> Vec<GroupFailure> {
    let mut failures = Vec::new();
    for spec in groups {
        let process = spec.qualified_process_name();
        if let Err(err) = transport.signal_process(&process, "TERM") {
            tracing::warn!("restart signal failed for '{process}': {err}");
            failures.push(GroupFailure {
                group: spec.group_name.clone(),
                operation: "signal",
                message: err.to_string(),
            });
        }
    }
    failures
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
