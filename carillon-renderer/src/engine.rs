//! Tera rendering engine — [`ConfigGenerator`] and [`GeneratedConfigSet`].
//!
//! # Artifact mapping
//!
//! | Artifact           | Output path                         |
//! |--------------------|-------------------------------------|
//! | Streaming server   | `<stations_dir>/<shortcode>.xml` (one per relay) |
//! | Reverse proxy      | `<stations_dir>/nginx.conf`         |
//! | Process supervisor | `<stations_dir>/supervisord.conf`   |

use std::path::{Path, PathBuf};

use tera::Tera;

use carillon_core::{validate_fleet, ProcessGroupSpec, RelayDefinition, Shortcode};

use crate::context::{GeneratorSettings, GroupCtx, ProxyRuleCtx, StreamCtx};
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates — baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("stream/config.xml.tera", include_str!("templates/icecast.xml.tera")),
    ("proxy/rules.conf.tera", include_str!("templates/nginx.conf.tera")),
    (
        "supervisor/groups.conf.tera",
        include_str!("templates/supervisord.conf.tera"),
    ),
];

const STREAM_TPL: &str = "stream/config.xml.tera";
const PROXY_TPL: &str = "proxy/rules.conf.tera";
const SUPERVISOR_TPL: &str = "supervisor/groups.conf.tera";

/// Streaming-server binary every process group runs.
const STREAM_BINARY: &str = "/usr/local/bin/icecast";

fn build_tera() -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TPLS.to_vec())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Generated config set
// ---------------------------------------------------------------------------

/// One rendered streaming-server config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    pub shortcode: Shortcode,
    pub path: PathBuf,
    pub content: String,
}

/// Everything one reconciliation cycle derives from the relay list.
///
/// Immutable once produced; owned by the cycle that produced it.
#[derive(Debug, Clone)]
pub struct GeneratedConfigSet {
    pub stream_configs: Vec<StreamConfig>,
    pub proxy_config: String,
    pub supervisor_config: String,
    pub process_groups: Vec<ProcessGroupSpec>,
}

impl GeneratedConfigSet {
    /// All `(path, content)` pairs a run must write, in a stable order.
    pub fn artifacts(&self, stations_dir: &Path) -> Vec<(PathBuf, &str)> {
        let mut out: Vec<(PathBuf, &str)> = self
            .stream_configs
            .iter()
            .map(|c| (c.path.clone(), c.content.as_str()))
            .collect();
        out.push((stations_dir.join("nginx.conf"), self.proxy_config.as_str()));
        out.push((
            stations_dir.join("supervisord.conf"),
            self.supervisor_config.as_str(),
        ));
        out
    }
}

// ---------------------------------------------------------------------------
// ConfigGenerator
// ---------------------------------------------------------------------------

/// Pure relay-list → config-set transformation.
///
/// No network or disk access; the only nondeterminism is the per-relay
/// source password (see [`crate::password`]). Create once and reuse.
pub struct ConfigGenerator {
    tera: Tera,
    settings: GeneratorSettings,
}

impl ConfigGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self, RenderError> {
        Ok(ConfigGenerator {
            tera: build_tera()?,
            settings,
        })
    }

    /// `<stations_dir>/<shortcode>.xml` — pure, no I/O.
    pub fn config_path_for(&self, shortcode: &Shortcode) -> PathBuf {
        self.settings.stations_dir.join(format!("{shortcode}.xml"))
    }

    /// Render the full config set for a relay fleet.
    ///
    /// Fleet and per-relay invariants are checked first; a violated invariant
    /// fails the whole generation (fatal to the run).
    pub fn generate(&self, relays: &[RelayDefinition]) -> Result<GeneratedConfigSet, RenderError> {
        validate_fleet(relays)?;

        let mut stream_configs = Vec::with_capacity(relays.len());
        let mut process_groups = Vec::with_capacity(relays.len());

        for relay in relays {
            let path = self.config_path_for(&relay.shortcode);

            let ctx = StreamCtx::from_relay(relay, &self.settings);
            let content = self
                .tera
                .render(STREAM_TPL, &tera::Context::from_serialize(&ctx)?)?;

            stream_configs.push(StreamConfig {
                shortcode: relay.shortcode.clone(),
                path: path.clone(),
                content,
            });

            process_groups.push(ProcessGroupSpec {
                group_name: ProcessGroupSpec::group_name_for(&relay.id),
                program_name: ProcessGroupSpec::program_name_for(&relay.id),
                command: format!("{STREAM_BINARY} -c {}", path.display()),
                directory: self.settings.stations_dir.clone(),
                stdout_logfile: "/dev/stdout".into(),
                stderr_logfile: "/dev/stderr".into(),
            });
        }

        let proxy_config = {
            let rules: Vec<ProxyRuleCtx> = relays
                .iter()
                .map(|r| ProxyRuleCtx {
                    shortcode: r.shortcode.0.clone(),
                    port: r.port,
                })
                .collect();
            let mut ctx = tera::Context::new();
            ctx.insert("stations", &rules);
            self.tera.render(PROXY_TPL, &ctx)?
        };

        let supervisor_config = {
            let groups: Vec<GroupCtx> = process_groups.iter().map(GroupCtx::from_spec).collect();
            let mut ctx = tera::Context::new();
            ctx.insert("groups", &groups);
            self.tera.render(SUPERVISOR_TPL, &ctx)?
        };

        Ok(GeneratedConfigSet {
            stream_configs,
            proxy_config,
            supervisor_config,
            process_groups,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
