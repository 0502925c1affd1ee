//! `carillon cert` — certificate status and standalone renewal entry point.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use carillon_acme::CertificateManager;
use carillon_core::Environment;

/// Arguments for `carillon cert`.
#[derive(Args, Debug)]
pub struct CertArgs {
    /// Renew even if the active certificate still looks valid.
    #[arg(long)]
    pub force: bool,

    /// Report on-disk certificate state without issuing anything.
    #[arg(long)]
    pub check: bool,
}

impl CertArgs {
    pub fn run(self) -> Result<()> {
        let env = Environment::from_env();
        let manager = CertificateManager::from_environment(&env);

        if self.check {
            return print_status(&env, &manager);
        }

        if env.acme_domains.is_empty() {
            bail!("no certificate domains configured; set CARILLON_ACME_DOMAINS");
        }

        // Issuance runs through a pluggable ACME engine; this binary does not
        // bundle a protocol implementation. Embedders drive the same lifecycle
        // via carillon_acme::CertificateManager::renew with their engine.
        let requested = if self.force { "forced renewal" } else { "renewal" };
        bail!(
            "{requested} requires an ACME engine, and none is available in this build; \
             certificate issuance must be driven by an embedding service"
        );
    }
}

fn print_status(env: &Environment, manager: &CertificateManager) -> Result<()> {
    let cert = manager.active_certificate();
    let key = manager.active_private_key();

    if env.acme_domains.is_empty() {
        println!("· certificate automation disabled (no CARILLON_ACME_DOMAINS)");
    } else {
        println!("· configured domains: {}", env.acme_domains.join(", "));
    }
    println!(
        "· authority environment: {}",
        if env.is_production() { "production" } else { "staging" }
    );

    for (label, path) in [("certificate", &cert), ("private key", &key)] {
        if path.exists() {
            println!("{} active {label}: {}", "✓".green(), path.display());
        } else {
            println!("{} no active {label} at {}", "✗".red(), path.display());
        }
    }
    Ok(())
}
