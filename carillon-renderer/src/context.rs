//! Template contexts — serializable rendering payloads built from
//! [`RelayDefinition`] plus the node-level [`GeneratorSettings`].

use std::path::PathBuf;

use serde::Serialize;

use carillon_core::{ProcessGroupSpec, RelayDefinition, RelayType};

use crate::password;

/// Node-level inputs the generator needs beyond the relay list.
///
/// Assembled by the caller (orchestrator or CLI) so the generator itself
/// stays free of I/O and environment access.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Host this node is reached at; becomes the streaming server hostname.
    pub public_host: String,
    /// Host of the parent installation; upstream for every relay/master block.
    pub parent_host: String,
    /// Directory the per-relay configs are written to.
    pub stations_dir: PathBuf,
    /// Stable path of the active certificate chain.
    pub ssl_certificate: PathBuf,
    /// Stable path of the active private key.
    pub ssl_private_key: PathBuf,
}

/// Context for one streaming-server config.
#[derive(Debug, Clone, Serialize)]
pub struct StreamCtx {
    pub hostname: String,
    pub shortcode: String,
    pub source_count: usize,
    pub source_password: String,
    pub relay_password: String,
    pub admin_password: String,
    pub port: u16,
    pub config_dir: String,
    pub ssl_certificate: String,
    pub ssl_private_key: String,
    /// Present only for the native master/slave relay strategy.
    pub master: Option<MasterCtx>,
    pub mounts: Vec<MountCtx>,
    pub relays: Vec<RelayCtx>,
}

/// `master-server*` keys for the native relay mechanism.
#[derive(Debug, Clone, Serialize)]
pub struct MasterCtx {
    pub server: String,
    pub port: u16,
    pub update_interval: u32,
    pub password: String,
}

/// One explicit `mount` block for the manual relay strategy.
#[derive(Debug, Clone, Serialize)]
pub struct MountCtx {
    pub path: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub genre: String,
}

/// One explicit `relay` block paired with a [`MountCtx`].
#[derive(Debug, Clone, Serialize)]
pub struct RelayCtx {
    pub server: String,
    pub port: u16,
    pub mount: String,
    pub local_mount: String,
}

/// Context for one proxy rule pair.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyRuleCtx {
    pub shortcode: String,
    pub port: u16,
}

/// Context for one `[group:*]`/`[program:*]` pair.
#[derive(Debug, Clone, Serialize)]
pub struct GroupCtx {
    pub group_name: String,
    pub program_name: String,
    pub command: String,
    pub directory: String,
    pub stdout_logfile: String,
    pub stderr_logfile: String,
}

const MASTER_UPDATE_INTERVAL: u32 = 120;

impl StreamCtx {
    /// Build the per-relay streaming-server context.
    ///
    /// Generates a fresh source password on every call — the one
    /// intentionally nondeterministic field in the whole config set.
    pub fn from_relay(relay: &RelayDefinition, settings: &GeneratorSettings) -> Self {
        let mut ctx = StreamCtx {
            hostname: settings.public_host.clone(),
            shortcode: relay.shortcode.0.clone(),
            source_count: relay.mounts.len(),
            source_password: password::generate_password(password::DEFAULT_LENGTH),
            relay_password: relay.relay_password.clone(),
            admin_password: relay.admin_password.clone(),
            port: relay.port,
            config_dir: settings.stations_dir.display().to_string(),
            ssl_certificate: settings.ssl_certificate.display().to_string(),
            ssl_private_key: settings.ssl_private_key.display().to_string(),
            master: None,
            mounts: vec![],
            relays: vec![],
        };

        if relay.relay_type == RelayType::NativeRelay && !relay.relay_password.is_empty() {
            // Built-in master/slave relaying: one block, no explicit mounts.
            ctx.master = Some(MasterCtx {
                server: settings.parent_host.clone(),
                port: relay.port,
                update_interval: MASTER_UPDATE_INTERVAL,
                password: relay.relay_password.clone(),
            });
        } else {
            // Relay each mount point individually, copying stream metadata.
            for mount in &relay.mounts {
                ctx.mounts.push(MountCtx {
                    path: mount.path.clone(),
                    name: relay.name.clone(),
                    description: relay.description.clone(),
                    url: relay.url.clone(),
                    genre: relay.genre.clone(),
                });
                ctx.relays.push(RelayCtx {
                    server: settings.parent_host.clone(),
                    port: relay.port,
                    mount: mount.path.clone(),
                    local_mount: mount.path.clone(),
                });
            }
        }

        ctx
    }
}

impl GroupCtx {
    pub fn from_spec(spec: &ProcessGroupSpec) -> Self {
        GroupCtx {
            group_name: spec.group_name.clone(),
            program_name: spec.program_name.clone(),
            command: spec.command.clone(),
            directory: spec.directory.display().to_string(),
            stdout_logfile: spec.stdout_logfile.clone(),
            stderr_logfile: spec.stderr_logfile.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use carillon_core::{Mount, RelayId, Shortcode};

    use super::*;

    fn settings() -> GeneratorSettings {
        GeneratorSettings {
            public_host: "relay.example.com".into(),
            parent_host: "radio.example.com".into(),
            stations_dir: PathBuf::from("/var/carillon/stations"),
            ssl_certificate: PathBuf::from("/var/carillon/acme/ssl.crt"),
            ssl_private_key: PathBuf::from("/var/carillon/acme/ssl.key"),
        }
    }

    fn relay(relay_type: RelayType, relay_password: &str, mounts: &[&str]) -> RelayDefinition {
        RelayDefinition {
            id: RelayId::from("1"),
            shortcode: Shortcode::from("alpha"),
            name: "Alpha FM".into(),
            description: "Community radio".into(),
            genre: "Various".into(),
            url: "https://alpha.example.com".into(),
            relay_type,
            port: 8000,
            admin_password: "admin-pw".into(),
            relay_password: relay_password.into(),
            mounts: mounts
                .iter()
                .map(|p| Mount {
                    path: (*p).to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn native_relay_with_password_uses_master_block() {
        let ctx = StreamCtx::from_relay(&relay(RelayType::NativeRelay, "secret", &[]), &settings());
        let master = ctx.master.expect("master block");
        assert_eq!(master.server, "radio.example.com");
        assert_eq!(master.port, 8000);
        assert_eq!(master.update_interval, 120);
        assert!(ctx.mounts.is_empty());
        assert!(ctx.relays.is_empty());
    }

    #[test]
    fn native_relay_without_password_falls_back_to_mounts() {
        let ctx = StreamCtx::from_relay(
            &relay(RelayType::NativeRelay, "", &["/radio.mp3"]),
            &settings(),
        );
        assert!(ctx.master.is_none());
        assert_eq!(ctx.mounts.len(), 1);
        assert_eq!(ctx.relays.len(), 1);
    }

    #[test]
    fn manual_relay_copies_metadata_onto_each_mount() {
        let ctx = StreamCtx::from_relay(
            &relay(RelayType::ManualRelay, "", &["/radio.mp3", "/radio.aac"]),
            &settings(),
        );
        assert_eq!(ctx.mounts.len(), 2);
        for mount in &ctx.mounts {
            assert_eq!(mount.name, "Alpha FM");
            assert_eq!(mount.description, "Community radio");
            assert_eq!(mount.genre, "Various");
        }
        assert_eq!(ctx.relays[1].mount, "/radio.aac");
        assert_eq!(ctx.relays[1].local_mount, "/radio.aac");
        assert_eq!(ctx.source_count, 2);
    }
}
