//! Domain types for the Carillon relay node.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Relay records are serializable/deserializable via serde + serde_json so the
//! registry response and the local snapshot share one model.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque relay identity assigned by the parent registry.
///
/// The registry serves ids as JSON numbers; older deployments served strings.
/// Both forms deserialize into the canonical string representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelayId(pub String);

impl fmt::Display for RelayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RelayId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RelayId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for RelayId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Num(n) => RelayId(n.to_string()),
            Raw::Str(s) => RelayId(s),
        })
    }
}

/// Filesystem- and URL-safe slug for a relay, unique within a fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shortcode(pub String);

impl fmt::Display for Shortcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Shortcode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Shortcode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a relay pulls audio from the parent installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RelayType {
    /// The streaming server's built-in master/slave relay mechanism.
    NativeRelay,
    /// One explicit relay definition per mount point.
    #[default]
    ManualRelay,
}

impl fmt::Display for RelayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayType::NativeRelay => write!(f, "native-relay"),
            RelayType::ManualRelay => write!(f, "manual-relay"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A single mount point on a relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    /// Mount path as served by the streaming server, e.g. `/radio.mp3`.
    pub path: String,
}

/// One relay as described by the parent registry.
///
/// Constructed fresh on every reconciliation cycle; never mutated. A copy is
/// persisted to disk as a snapshot (see [`crate::snapshot`]) but the snapshot
/// is data for offline consumers, not live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayDefinition {
    pub id: RelayId,
    pub shortcode: Shortcode,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "type")]
    pub relay_type: RelayType,
    pub port: u16,
    #[serde(default)]
    pub admin_password: String,
    #[serde(default)]
    pub relay_password: String,
    #[serde(default)]
    pub mounts: Vec<Mount>,
}

impl RelayDefinition {
    /// Check per-relay invariants.
    ///
    /// A manual relay needs at least one mount (there is nothing to proxy
    /// otherwise); a native relay needs the parent's relay password to
    /// authenticate the master connection.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.port == 0 {
            return Err(CoreError::InvalidRelay {
                shortcode: self.shortcode.0.clone(),
                reason: "port must be nonzero".into(),
            });
        }

        match self.relay_type {
            RelayType::ManualRelay if self.mounts.is_empty() => {
                return Err(CoreError::InvalidRelay {
                    shortcode: self.shortcode.0.clone(),
                    reason: "manual relay has no mounts".into(),
                });
            }
            RelayType::NativeRelay if self.relay_password.is_empty() => {
                return Err(CoreError::InvalidRelay {
                    shortcode: self.shortcode.0.clone(),
                    reason: "native relay has no relay password".into(),
                });
            }
            _ => {}
        }

        let mut seen = std::collections::BTreeSet::new();
        for mount in &self.mounts {
            if !seen.insert(mount.path.as_str()) {
                return Err(CoreError::InvalidRelay {
                    shortcode: self.shortcode.0.clone(),
                    reason: format!("duplicate mount path '{}'", mount.path),
                });
            }
        }

        Ok(())
    }
}

/// Check fleet-wide invariants: ids, shortcodes and ports must be unique.
pub fn validate_fleet(relays: &[RelayDefinition]) -> Result<(), CoreError> {
    let mut ids = std::collections::BTreeSet::new();
    let mut shortcodes = std::collections::BTreeSet::new();
    let mut ports = std::collections::BTreeSet::new();

    for relay in relays {
        relay.validate()?;
        if !ids.insert(relay.id.0.as_str()) {
            return Err(CoreError::InvalidFleet {
                reason: format!("duplicate relay id '{}'", relay.id),
            });
        }
        if !shortcodes.insert(relay.shortcode.0.as_str()) {
            return Err(CoreError::InvalidFleet {
                reason: format!("duplicate shortcode '{}'", relay.shortcode),
            });
        }
        if !ports.insert(relay.port) {
            return Err(CoreError::InvalidFleet {
                reason: format!("duplicate port {}", relay.port),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Process groups
// ---------------------------------------------------------------------------

/// Declarative description of one supervisor process group.
///
/// Uniquely keyed by `group_name`; owned by the reconciliation cycle that
/// produced it and compared structurally (never by identity) against the
/// supervisor's live groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessGroupSpec {
    pub group_name: String,
    pub program_name: String,
    pub command: String,
    pub directory: PathBuf,
    pub stdout_logfile: String,
    pub stderr_logfile: String,
}

impl ProcessGroupSpec {
    /// `station_<id>` — the group name derived from a relay identity.
    pub fn group_name_for(id: &RelayId) -> String {
        format!("station_{id}")
    }

    /// `station_<id>_relay` — the program name derived from a relay identity.
    pub fn program_name_for(id: &RelayId) -> String {
        format!("station_{id}_relay")
    }

    /// `group:program` — the fully qualified process name the supervisor
    /// expects for signal delivery.
    pub fn qualified_process_name(&self) -> String {
        format!("{}:{}", self.group_name, self.program_name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
