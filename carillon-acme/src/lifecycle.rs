//! Certificate lifecycle orchestration.
//!
//! # File layout
//!
//! ```text
//! <acme_dir>/
//!   account_key.pem    account key, created once, kept for the deployment
//!   acme.key           issuance private key (reused across renewals)
//!   acme.crt           latest issued full chain
//!   ssl.crt -> acme.crt   stable alias consumers read
//!   ssl.key -> acme.key   stable alias consumers read
//!   challenges/        transient HTTP-01 tokens, empty between runs
//! ```
//!
//! The aliases are re-pointed only after the chain is fully on disk, so an
//! interrupted issuance leaves the previous certificate active.

use std::path::{Path, PathBuf};

use carillon_core::Environment;

use crate::alias;
use crate::challenge::ChallengeResponder;
use crate::engine::AcmeEngine;
use crate::error::{io_err, AcmeError};

/// Renew once remaining validity drops to this many days.
pub const RENEWAL_THRESHOLD_DAYS: i64 = 30;

const ACCOUNT_KEY_FILE: &str = "account_key.pem";
const ISSUANCE_KEY_FILE: &str = "acme.key";
const CHAIN_FILE: &str = "acme.crt";
const ACTIVE_CERT_FILE: &str = "ssl.crt";
const ACTIVE_KEY_FILE: &str = "ssl.key";
const CHALLENGE_DIR: &str = "challenges";

/// Stable `(certificate, private key)` alias paths under `acme_dir`.
///
/// Consumers (config generation in particular) reference these without
/// caring whether a certificate has ever been issued.
pub fn certificate_paths(acme_dir: &Path) -> (PathBuf, PathBuf) {
    (
        acme_dir.join(ACTIVE_CERT_FILE),
        acme_dir.join(ACTIVE_KEY_FILE),
    )
}

/// Result of one renewal attempt that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// A new chain was issued and activated.
    Renewed { domains: Vec<String> },
    /// Nothing to do; callers must not report this as a failure.
    Skipped { reason: String },
}

/// Dependent-service reload hook, fired after successful activation.
///
/// Failures are reported as text and logged by the manager, never escalated:
/// the certificate is already valid on disk and the next full cycle
/// reconciles service state anyway.
pub trait ProxyReload {
    fn reload_proxy(&mut self) -> Result<(), String>;
}

/// Reload hook for contexts with no proxy to notify (tests, cold bootstrap).
pub struct NoReload;

impl ProxyReload for NoReload {
    fn reload_proxy(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// Sequences account bootstrap, renewal evaluation, issuance and activation
/// around a black-box [`AcmeEngine`].
pub struct CertificateManager {
    acme_dir: PathBuf,
    domains: Vec<String>,
    contact_email: Option<String>,
}

impl CertificateManager {
    pub fn new(
        acme_dir: impl Into<PathBuf>,
        domains: Vec<String>,
        contact_email: Option<String>,
    ) -> Self {
        CertificateManager {
            acme_dir: acme_dir.into(),
            domains,
            contact_email,
        }
    }

    pub fn from_environment(env: &Environment) -> Self {
        Self::new(
            env.acme_directory(),
            env.acme_domains.clone(),
            env.acme_email.clone(),
        )
    }

    pub fn active_certificate(&self) -> PathBuf {
        self.acme_dir.join(ACTIVE_CERT_FILE)
    }

    pub fn active_private_key(&self) -> PathBuf {
        self.acme_dir.join(ACTIVE_KEY_FILE)
    }

    fn account_key_path(&self) -> PathBuf {
        self.acme_dir.join(ACCOUNT_KEY_FILE)
    }

    fn issuance_key_path(&self) -> PathBuf {
        self.acme_dir.join(ISSUANCE_KEY_FILE)
    }

    fn chain_path(&self) -> PathBuf {
        self.acme_dir.join(CHAIN_FILE)
    }

    fn challenge_dir(&self) -> PathBuf {
        self.acme_dir.join(CHALLENGE_DIR)
    }

    /// Load the persisted account key into the engine, or create, register
    /// and persist one. Happens at most once per deployment lifetime,
    /// keyed on the key file's existence.
    fn ensure_account(&self, engine: &mut dyn AcmeEngine) -> Result<(), AcmeError> {
        let path = self.account_key_path();
        if path.exists() {
            let key = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            engine.load_account_key(&key)?;
            return Ok(());
        }

        let key = engine.generate_key()?;
        engine.load_account_key(&key)?;
        engine.register_account(self.contact_email.as_deref())?;
        atomic_write(&path, &key)?;
        tracing::info!("registered new certificate account");
        Ok(())
    }

    /// Whether the active chain must be replaced.
    ///
    /// True when forced, when no chain exists, when a required domain is not
    /// covered by the chain's SAN set, or when remaining validity is at or
    /// below [`RENEWAL_THRESHOLD_DAYS`].
    pub fn requires_renewal(
        &self,
        engine: &dyn AcmeEngine,
        force: bool,
    ) -> Result<bool, AcmeError> {
        if force {
            return Ok(true);
        }

        let chain_path = self.chain_path();
        if !chain_path.exists() {
            return Ok(true);
        }

        let chain = std::fs::read_to_string(&chain_path).map_err(|e| io_err(&chain_path, e))?;
        let covered = engine.certificate_domains(&chain)?;
        if self
            .domains
            .iter()
            .any(|required| !covered.contains(required))
        {
            return Ok(true);
        }

        Ok(engine.remaining_validity_days(&chain)? <= RENEWAL_THRESHOLD_DAYS)
    }

    /// Run one renewal attempt.
    ///
    /// "Not needed" is a [`RenewalOutcome::Skipped`], not an error. On any
    /// issuance failure the previous aliases stay untouched, every published
    /// challenge is retracted, and the error surfaces to the caller — no
    /// retries inside this call.
    pub fn renew(
        &self,
        engine: &mut dyn AcmeEngine,
        proxy: &mut dyn ProxyReload,
        force: bool,
    ) -> Result<RenewalOutcome, AcmeError> {
        if self.domains.is_empty() {
            return Ok(RenewalOutcome::Skipped {
                reason: "no certificate domains configured".into(),
            });
        }

        std::fs::create_dir_all(&self.acme_dir).map_err(|e| io_err(&self.acme_dir, e))?;
        self.ensure_account(engine)?;

        if !self.requires_renewal(engine, force)? {
            return Ok(RenewalOutcome::Skipped {
                reason: "certificate still valid".into(),
            });
        }

        let key_path = self.issuance_key_path();
        let key_pem = if key_path.exists() {
            std::fs::read_to_string(&key_path).map_err(|e| io_err(&key_path, e))?
        } else {
            let key = engine.generate_key()?;
            atomic_write(&key_path, &key)?;
            key
        };

        // The responder retracts every published token when it leaves this
        // scope, on success and on every failure path alike.
        let chain = {
            let mut responder = ChallengeResponder::new(self.challenge_dir());
            let result = engine.issue(&key_pem, &self.domains, &mut responder);
            responder.retract_all();
            result?
        };

        let chain_path = self.chain_path();
        atomic_write(&chain_path, &chain)?;

        // Activation: chain is fully on disk, now swap the stable aliases.
        alias::repoint(&self.active_certificate(), &chain_path)?;
        alias::repoint(&self.active_private_key(), &key_path)?;

        if let Err(message) = proxy.reload_proxy() {
            tracing::error!("proxy reload after certificate renewal failed: {message}");
        }

        tracing::info!(
            "certificate renewed for {} domain(s)",
            self.domains.len()
        );
        Ok(RenewalOutcome::Renewed {
            domains: self.domains.clone(),
        })
    }
}

/// Whole-file atomic write: `.tmp` sibling, then rename.
fn atomic_write(path: &Path, content: &str) -> Result<(), AcmeError> {
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}
