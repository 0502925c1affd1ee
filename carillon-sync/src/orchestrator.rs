//! Top-level run sequencing: fetch → snapshot → generate → write →
//! certificate → reconcile → optional broad restart.
//!
//! One run is a linear, synchronous pipeline. Fatal steps abort with a
//! [`SyncError`]; non-fatal steps (certificate phase, per-group operations)
//! are captured in the [`RunReport`] so an operator can tell "renewal failed
//! but relays are running" apart from "the run failed". Runs are not
//! re-entrant — the caller invokes them from a single external trigger.

use thiserror::Error;

use carillon_acme::{certificate_paths, AcmeEngine, CertificateManager, ProxyReload, RenewalOutcome};
use carillon_core::{environment, snapshot, Environment, RelayDefinition};
use carillon_renderer::{ConfigGenerator, GeneratedConfigSet, GeneratorSettings};

use crate::diff::{self, FileDiff, TopologyDiff};
use crate::error::SyncError;
use crate::reconciler::{self, GroupFailure};
use crate::transport::{SupervisorTransport, PROXY_PROCESS, PROXY_RELOAD_SIGNAL};
use crate::writer::{self, WriteResult};

// ---------------------------------------------------------------------------
// External registry seam
// ---------------------------------------------------------------------------

/// Opaque registry failure — transport and deserialization problems alike
/// collapse into one fatal error for the run.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// The remote fleet registry, consumed as a black box.
pub trait FleetRegistry {
    fn list_relays(&mut self) -> Result<Vec<RelayDefinition>, FetchError>;
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Outcome of the non-fatal certificate phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertOutcome {
    Renewed { domains: Vec<String> },
    Skipped { reason: String },
    Failed { message: String },
}

/// Everything one run did, for operator-facing reporting.
#[derive(Debug)]
pub struct RunReport {
    pub relay_count: usize,
    pub writes: Vec<WriteResult>,
    pub cert: CertOutcome,
    pub affected_groups: Vec<String>,
    pub group_failures: Vec<GroupFailure>,
    pub restarted: bool,
    pub restart_failures: Vec<GroupFailure>,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Wires the generator, writer, certificate manager and reconciler to their
/// external collaborators for one node.
pub struct UpdateOrchestrator<'a> {
    env: &'a Environment,
    registry: &'a mut dyn FleetRegistry,
    supervisor: &'a mut dyn SupervisorTransport,
    acme_engine: Option<&'a mut dyn AcmeEngine>,
}

impl<'a> UpdateOrchestrator<'a> {
    pub fn new(
        env: &'a Environment,
        registry: &'a mut dyn FleetRegistry,
        supervisor: &'a mut dyn SupervisorTransport,
    ) -> Self {
        UpdateOrchestrator {
            env,
            registry,
            supervisor,
            acme_engine: None,
        }
    }

    /// Attach the ACME engine the certificate phase drives. Without one the
    /// phase is skipped (no domains) or reported failed (domains configured).
    pub fn with_acme_engine(mut self, engine: &'a mut dyn AcmeEngine) -> Self {
        self.acme_engine = Some(engine);
        self
    }

    /// Execute one full reconciliation run.
    pub fn run(&mut self, force_restart: bool) -> Result<RunReport, SyncError> {
        // Fetch first and fail fast: nothing local changes on registry errors.
        let relays = self
            .registry
            .list_relays()
            .map_err(|e| SyncError::Registry { message: e.0 })?;
        tracing::info!("registry returned {} relay(s)", relays.len());

        environment::ensure_directories(self.env)?;
        snapshot::save_relays(&self.env.stations_directory(), &relays)?;

        let set = generate_config_set(self.env, &relays)?;
        let stations_dir = self.env.stations_directory();
        let artifacts = set.artifacts(&stations_dir);
        let writes = writer::write_artifacts(&self.env.state_directory(), &artifacts)?;

        let cert = self.certificate_phase();

        // The supervisor diffs its own tracked config file on reload; an
        // unreachable supervisor is fatal, per-group failures are not.
        let outcome = self.supervisor.reload_config()?;
        let topology = TopologyDiff::from_reload(&outcome, &set.process_groups);
        let reconcile_report = if topology.is_empty() {
            tracing::debug!("topology unchanged; reconciliation is a no-op");
            reconciler::ReconcileReport::default()
        } else {
            reconciler::reconcile(self.supervisor, &topology)
        };

        snapshot::save_groups(&self.env.state_directory(), &set.process_groups)?;

        let restart_failures = if force_restart {
            tracing::info!("forcing restart of all relay processes");
            reconciler::force_restart(self.supervisor, &set.process_groups)
        } else {
            Vec::new()
        };

        Ok(RunReport {
            relay_count: relays.len(),
            writes,
            cert,
            affected_groups: reconcile_report.affected,
            group_failures: reconcile_report.failures,
            restarted: force_restart,
            restart_failures,
        })
    }

    fn certificate_phase(&mut self) -> CertOutcome {
        if self.env.acme_domains.is_empty() {
            return CertOutcome::Skipped {
                reason: "no certificate domains configured".into(),
            };
        }

        let Some(engine) = self.acme_engine.as_deref_mut() else {
            tracing::error!("certificate domains configured but no ACME engine is available");
            return CertOutcome::Failed {
                message: "no ACME engine configured".into(),
            };
        };

        let manager = CertificateManager::from_environment(self.env);
        let mut reload = ProxyReloadAdapter {
            transport: &mut *self.supervisor,
        };
        match manager.renew(engine, &mut reload, false) {
            Ok(RenewalOutcome::Renewed { domains }) => CertOutcome::Renewed { domains },
            Ok(RenewalOutcome::Skipped { reason }) => CertOutcome::Skipped { reason },
            Err(err) => {
                tracing::error!("certificate renewal failed: {err}");
                CertOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }
}

/// Proxy reload expressed through the supervisor transport.
struct ProxyReloadAdapter<'t> {
    transport: &'t mut dyn SupervisorTransport,
}

impl ProxyReload for ProxyReloadAdapter<'_> {
    fn reload_proxy(&mut self) -> Result<(), String> {
        self.transport
            .signal_process(PROXY_PROCESS, PROXY_RELOAD_SIGNAL)
            .map_err(|e| e.to_string())
    }
}

/// Build the generator for this node and render the config set.
fn generate_config_set(
    env: &Environment,
    relays: &[RelayDefinition],
) -> Result<GeneratedConfigSet, SyncError> {
    let (ssl_certificate, ssl_private_key) = certificate_paths(&env.acme_directory());
    let settings = GeneratorSettings {
        public_host: env.relay_host().map_err(SyncError::Core)?,
        parent_host: env.parent_host().map_err(SyncError::Core)?,
        stations_dir: env.stations_directory(),
        ssl_certificate,
        ssl_private_key,
    };
    let generator = ConfigGenerator::new(settings)?;
    Ok(generator.generate(relays)?)
}

// ---------------------------------------------------------------------------
// Offline preview
// ---------------------------------------------------------------------------

/// What `update` would change, computed from the local snapshot alone.
#[derive(Debug)]
pub struct PreviewReport {
    pub file_diffs: Vec<FileDiff>,
    pub topology: TopologyDiff,
}

/// Regenerate from the persisted snapshot and compare against disk — no
/// network, no writes, no supervisor calls.
///
/// Artifact content containing the regenerated source password always
/// differs; the preview is for spotting structural drift, and the topology
/// diff uses the structural equality rule, not file bytes.
pub fn preview(env: &Environment) -> Result<PreviewReport, SyncError> {
    let relays = snapshot::load_relays(&env.stations_directory()).map_err(SyncError::Core)?;
    let set = generate_config_set(env, &relays)?;

    let stations_dir = env.stations_directory();
    let artifacts = set.artifacts(&stations_dir);
    let file_diffs = diff::diff_artifacts(&artifacts)?;

    let previous = snapshot::load_groups(&env.state_directory()).map_err(SyncError::Core)?;
    let topology = diff::diff(&previous, &set.process_groups);

    Ok(PreviewReport {
        file_diffs,
        topology,
    })
}
