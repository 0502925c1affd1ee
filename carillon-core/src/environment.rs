//! Node configuration threaded explicitly into every component.
//!
//! The original deployment model keeps all settings in environment variables
//! (one flat `CARILLON_*` namespace); this type is the single place they are
//! read. Components receive an `&Environment` from their constructor — there
//! is no process-wide instance.
//!
//! # Directory layout
//!
//! ```text
//! <base_dir>/
//!   stations/        generated configs + stations.json snapshot
//!   acme/            account key, issued certificates, challenge files
//!   state/           hash store, previous topology snapshot, supervisor socket
//! ```

use std::path::PathBuf;

use url::Url;

use crate::error::CoreError;

/// Deployment environment of the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Production,
    Testing,
    Development,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "testing" => AppEnv::Testing,
            "development" => AppEnv::Development,
            _ => AppEnv::Production,
        }
    }
}

/// Immutable node configuration.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Data root; everything the node writes lives below this.
    pub base_dir: PathBuf,
    /// Base URL of the parent installation the node relays for.
    pub parent_base_url: Option<String>,
    /// API key authorizing registry calls against the parent.
    pub parent_api_key: Option<String>,
    /// Public base URL of this relay node.
    pub relay_base_url: Option<String>,
    /// Display name reported back to the parent.
    pub relay_name: String,
    /// Whether this node is listed on the parent's public pages.
    pub relay_is_public: bool,
    /// Domains the TLS certificate must cover; empty disables issuance.
    pub acme_domains: Vec<String>,
    /// Contact email for certificate-account registration.
    pub acme_email: Option<String>,
    /// Path of the supervisor control socket.
    pub supervisor_socket: PathBuf,
    pub app_env: AppEnv,
}

impl Environment {
    pub const DEFAULT_BASE_DIR: &'static str = "/var/carillon";
    pub const DEFAULT_RELAY_NAME: &'static str = "Carillon";

    /// Read the full configuration from `CARILLON_*` environment variables.
    pub fn from_env() -> Self {
        let base_dir = PathBuf::from(
            std::env::var("CARILLON_BASE_DIR").unwrap_or_else(|_| Self::DEFAULT_BASE_DIR.into()),
        );
        let supervisor_socket = std::env::var("CARILLON_SUPERVISOR_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|_| base_dir.join("state").join("supervisor.sock"));

        Environment {
            parent_base_url: non_empty(std::env::var("CARILLON_PARENT_BASE_URL").ok()),
            parent_api_key: non_empty(std::env::var("CARILLON_PARENT_API_KEY").ok()),
            relay_base_url: non_empty(std::env::var("CARILLON_RELAY_BASE_URL").ok()),
            relay_name: std::env::var("CARILLON_RELAY_NAME")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| Self::DEFAULT_RELAY_NAME.into()),
            relay_is_public: env_to_bool(std::env::var("CARILLON_RELAY_IS_PUBLIC").ok().as_deref()),
            acme_domains: split_domains(std::env::var("CARILLON_ACME_DOMAINS").ok().as_deref()),
            acme_email: non_empty(std::env::var("CARILLON_ACME_EMAIL").ok()),
            app_env: AppEnv::parse(&std::env::var("APPLICATION_ENV").unwrap_or_default()),
            base_dir,
            supervisor_socket,
        }
    }

    /// Minimal configuration rooted at an explicit directory; used in tests.
    pub fn rooted_at(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        Environment {
            supervisor_socket: base_dir.join("state").join("supervisor.sock"),
            parent_base_url: None,
            parent_api_key: None,
            relay_base_url: None,
            relay_name: Self::DEFAULT_RELAY_NAME.into(),
            relay_is_public: false,
            acme_domains: vec![],
            acme_email: None,
            app_env: AppEnv::Testing,
            base_dir,
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }

    /// `<base_dir>/stations` — generated configs and the relay snapshot.
    pub fn stations_directory(&self) -> PathBuf {
        self.base_dir.join("stations")
    }

    /// `<base_dir>/acme` — certificate material.
    pub fn acme_directory(&self) -> PathBuf {
        self.base_dir.join("acme")
    }

    /// `<base_dir>/state` — node-private bookkeeping.
    pub fn state_directory(&self) -> PathBuf {
        self.base_dir.join("state")
    }

    /// Host component of the parent base URL.
    pub fn parent_host(&self) -> Result<String, CoreError> {
        host_of(self.parent_base_url.as_deref(), "CARILLON_PARENT_BASE_URL")
    }

    /// Host component of this node's public base URL.
    pub fn relay_host(&self) -> Result<String, CoreError> {
        host_of(self.relay_base_url.as_deref(), "CARILLON_RELAY_BASE_URL")
    }
}

fn host_of(base_url: Option<&str>, name: &'static str) -> Result<String, CoreError> {
    let raw = base_url.ok_or(CoreError::MissingConfig { name })?;
    let parsed = Url::parse(raw).map_err(|e| CoreError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(str::to_owned)
        .ok_or_else(|| CoreError::InvalidUrl {
            url: raw.to_owned(),
            reason: "no host component".into(),
        })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn split_domains(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Coerce the loose boolean forms accepted in env files: `y…`, `true`, `1`.
pub fn env_to_bool(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let lowered = value.to_ascii_lowercase();
    lowered.starts_with('y') || lowered == "true" || value == "1"
}

/// Ensure the three node directories exist under `base_dir`.
pub fn ensure_directories(env: &Environment) -> Result<(), CoreError> {
    for dir in [
        env.stations_directory(),
        env.acme_directory(),
        env.state_directory(),
    ] {
        std::fs::create_dir_all(&dir).map_err(|e| crate::error::io_err(&dir, e))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("yes"), true)]
    #[case(Some("Y"), true)]
    #[case(Some("true"), true)]
    #[case(Some("TRUE"), true)]
    #[case(Some("1"), true)]
    #[case(Some("0"), false)]
    #[case(Some("no"), false)]
    #[case(Some(""), false)]
    #[case(None, false)]
    fn env_bool_coercion(#[case] input: Option<&str>, #[case] expected: bool) {
        assert_eq!(env_to_bool(input), expected);
    }

    #[test]
    fn directories_derive_from_base() {
        let env = Environment::rooted_at("/srv/node");
        assert_eq!(env.stations_directory(), PathBuf::from("/srv/node/stations"));
        assert_eq!(env.acme_directory(), PathBuf::from("/srv/node/acme"));
        assert_eq!(env.state_directory(), PathBuf::from("/srv/node/state"));
    }

    #[test]
    fn parent_host_requires_configuration() {
        let env = Environment::rooted_at("/tmp/x");
        assert!(matches!(
            env.parent_host(),
            Err(CoreError::MissingConfig { .. })
        ));
    }

    #[test]
    fn parent_host_extracts_host_component() {
        let mut env = Environment::rooted_at("/tmp/x");
        env.parent_base_url = Some("https://radio.example.com:8443/".into());
        assert_eq!(env.parent_host().expect("host"), "radio.example.com");
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let mut env = Environment::rooted_at("/tmp/x");
        env.relay_base_url = Some("not a url".into());
        assert!(matches!(env.relay_host(), Err(CoreError::InvalidUrl { .. })));
    }

    #[test]
    fn domain_splitting_trims_and_drops_empties() {
        assert_eq!(
            split_domains(Some("relay.example.com, cdn.example.com ,,")),
            vec!["relay.example.com".to_string(), "cdn.example.com".to_string()]
        );
        assert!(split_domains(None).is_empty());
    }
}
