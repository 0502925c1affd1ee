//! `carillon nowplaying` — report per-mount listener data to the parent.
//!
//! Reads the snapshot (never the live topology), queries each relay's local
//! status endpoint and pushes the aggregate upstream. A relay that is not
//! answering locally is reported as null rather than aborting the whole push.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::{json, Map, Value};

use carillon_core::{snapshot, Environment, RelayDefinition};

use crate::api::{self, ParentApi};
use crate::commands::require_parent;

/// Arguments for `carillon nowplaying`.
#[derive(Args, Debug)]
pub struct NowPlayingArgs {}

impl NowPlayingArgs {
    pub fn run(self) -> Result<()> {
        let env = Environment::from_env();
        let (base_url, api_key) = require_parent(&env)?;

        let relays = snapshot::load_relays(&env.stations_directory())
            .context("no relay snapshot; run `carillon update` first")?;

        let mut now_playing = Map::new();
        for relay in &relays {
            now_playing.insert(relay.id.to_string(), collect_for_relay(relay));
        }

        if now_playing.is_empty() {
            println!("· no relays in snapshot; nothing to report");
            return Ok(());
        }

        let payload = json!({
            "base_url": env.relay_base_url,
            "name": env.relay_name,
            "is_public": env.relay_is_public,
            "now_playing": Value::Object(now_playing),
        });

        let api = ParentApi::new(base_url, api_key);
        api.update_relays(&payload)
            .map_err(|e| anyhow::anyhow!("now-playing push failed: {e}"))?;

        println!("{} now-playing data reported for {} relay(s)", "✓".green(), relays.len());
        Ok(())
    }
}

/// Per-mount status entries for one relay, keyed by mount path.
fn collect_for_relay(relay: &RelayDefinition) -> Value {
    let status = match api::local_status(relay.port) {
        Ok(status) => status,
        Err(err) => {
            eprintln!("  · relay '{}' not answering locally: {err}", relay.shortcode);
            return Value::Null;
        }
    };

    let sources = sources_of(&status);
    let mut mounts = Map::new();
    for mount in &relay.mounts {
        let entry = sources
            .iter()
            .find(|s| {
                s.get("listenurl")
                    .and_then(Value::as_str)
                    .is_some_and(|u| u.ends_with(&mount.path))
            })
            .cloned()
            .unwrap_or(Value::Null);
        mounts.insert(mount.path.clone(), entry);
    }
    Value::Object(mounts)
}

/// `icestats.source` is an array with several mounts, a bare object with one,
/// absent with none.
fn sources_of(status: &Value) -> Vec<Value> {
    match status.get("icestats").and_then(|s| s.get("source")) {
        Some(Value::Array(entries)) => entries.clone(),
        Some(entry @ Value::Object(_)) => vec![entry.clone()],
        _ => vec![],
    }
}
