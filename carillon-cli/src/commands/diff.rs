//! `carillon diff` — offline preview of what `update` would change.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use carillon_core::Environment;
use carillon_sync::preview;

/// Arguments for `carillon diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let env = Environment::from_env();
        let report = preview(&env).context("diff preview failed (run `carillon update` first?)")?;

        if report.topology.is_empty() && report.file_diffs.is_empty() {
            println!("{} no drift between snapshot and disk", "✓".green());
            return Ok(());
        }

        if !report.topology.is_empty() {
            println!("{}", "process groups:".bold());
            for spec in &report.topology.added {
                println!("  {} {}", "+".green(), spec.group_name);
            }
            for spec in &report.topology.changed {
                println!("  {} {}", "~".yellow(), spec.group_name);
            }
            for name in &report.topology.removed {
                println!("  {} {}", "-".red(), name);
            }
            println!();
        }

        for diff in &report.file_diffs {
            println!("{}", diff.path.display().to_string().bold());
            print!("{}", diff.unified_diff);
            println!();
        }
        Ok(())
    }
}
