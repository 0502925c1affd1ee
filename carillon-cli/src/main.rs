//! Carillon — audio-relay node management CLI.
//!
//! # Usage
//!
//! ```text
//! carillon update [--restart-all]
//! carillon cert [--force] [--check]
//! carillon status [--json]
//! carillon diff
//! carillon nowplaying
//! ```
//!
//! All configuration comes from `CARILLON_*` environment variables; see
//! `carillon_core::Environment`.

mod api;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    cert::CertArgs, diff::DiffArgs, nowplaying::NowPlayingArgs, status::StatusArgs,
    update::UpdateArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "carillon",
    version,
    about = "Keep a local audio-relay fleet in sync with its parent installation",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the relay list, regenerate configs and reconcile the supervisor.
    Update(UpdateArgs),

    /// Inspect or renew the node's TLS certificate.
    Cert(CertArgs),

    /// Show the relay fleet from the last snapshot.
    Status(StatusArgs),

    /// Preview what `update` would change, from the snapshot alone.
    Diff(DiffArgs),

    /// Report per-mount listener data back to the parent.
    Nowplaying(NowPlayingArgs),
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Update(args) => args.run(),
        Commands::Cert(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Nowplaying(args) => args.run(),
    }
}
