//! `carillon status` — offline fleet table from the local snapshot.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use carillon_core::{snapshot, CoreError, Environment};

/// Arguments for `carillon status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit the raw snapshot as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct RelayRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Shortcode")]
    shortcode: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    relay_type: String,
    #[tabled(rename = "Port")]
    port: u16,
    #[tabled(rename = "Mounts")]
    mounts: usize,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let env = Environment::from_env();
        let relays = match snapshot::load_relays(&env.stations_directory()) {
            Ok(relays) => relays,
            Err(CoreError::SnapshotNotFound { .. }) => {
                println!("No snapshot yet. Run `carillon update` first.");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&relays)?);
            return Ok(());
        }

        let rows: Vec<RelayRow> = relays
            .iter()
            .map(|r| RelayRow {
                id: r.id.to_string(),
                shortcode: r.shortcode.to_string(),
                name: r.name.clone(),
                relay_type: r.relay_type.to_string(),
                port: r.port,
                mounts: r.mounts.len(),
            })
            .collect();

        println!(
            "{} {} relay(s) in the last snapshot",
            "✓".green(),
            rows.len()
        );
        println!("{}", Table::new(rows).with(Style::rounded()));
        Ok(())
    }
}
