//! `carillon update` — pull the relay list and reconcile the node onto it.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use carillon_core::Environment;
use carillon_sync::{CertOutcome, SocketSupervisor, UpdateOrchestrator, WriteResult};

use crate::api::ParentApi;
use crate::commands::require_parent;

/// Arguments for `carillon update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Force a restart of all relay processes after reconciling.
    #[arg(long)]
    pub restart_all: bool,
}

impl UpdateArgs {
    pub fn run(self) -> Result<()> {
        let env = Environment::from_env();
        let (base_url, api_key) = require_parent(&env)?;
        if env.relay_base_url.is_none() {
            bail!("relay base URL is not configured; set CARILLON_RELAY_BASE_URL");
        }

        let mut registry = ParentApi::new(base_url, api_key);
        let mut supervisor = SocketSupervisor::new(&env.supervisor_socket);

        let report = UpdateOrchestrator::new(&env, &mut registry, &mut supervisor)
            .run(self.restart_all)
            .context("update run failed")?;

        let written = report
            .writes
            .iter()
            .filter(|w| matches!(w, WriteResult::Written { .. }))
            .count();
        let unchanged = report.writes.len() - written;
        println!(
            "{} synced {} relay(s) ({written} written, {unchanged} unchanged)",
            "✓".green(),
            report.relay_count
        );

        match &report.cert {
            CertOutcome::Renewed { domains } => {
                println!("  {} certificate renewed for {} domain(s)", "✓".green(), domains.len());
            }
            CertOutcome::Skipped { reason } => println!("  · certificate: {reason}"),
            CertOutcome::Failed { message } => {
                eprintln!("  {} certificate renewal failed: {message}", "✗".red());
            }
        }

        if report.affected_groups.is_empty() {
            println!("  · process groups unchanged");
        } else {
            println!("  ✎ affected groups: {}", report.affected_groups.join(", "));
        }
        for failure in &report.group_failures {
            eprintln!(
                "  {} {} failed for '{}': {}",
                "✗".red(),
                failure.operation,
                failure.group,
                failure.message
            );
        }

        if report.restarted {
            if report.restart_failures.is_empty() {
                println!("  {} restarted all relay processes", "✓".green());
            } else {
                for failure in &report.restart_failures {
                    eprintln!(
                        "  {} restart signal failed for '{}': {}",
                        "✗".red(),
                        failure.group,
                        failure.message
                    );
                }
            }
        }

        Ok(())
    }
}
