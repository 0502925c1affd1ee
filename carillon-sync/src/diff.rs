//! Topology diffing plus unified-text artifact diffs for the dry-run preview.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use carillon_core::ProcessGroupSpec;

use crate::error::{io_err, SyncError};
use crate::transport::ReloadOutcome;

// ---------------------------------------------------------------------------
// Topology diff
// ---------------------------------------------------------------------------

/// Minimal set of supervisor operations separating two topologies.
///
/// Computed once per cycle, consumed once by the reconciler, discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyDiff {
    pub added: Vec<ProcessGroupSpec>,
    pub changed: Vec<ProcessGroupSpec>,
    pub removed: Vec<String>,
}

impl TopologyDiff {
    /// True when reconciliation would be a no-op.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// Lift the supervisor's own reload diff (bare group names) into spec
    /// form by resolving names against the freshly generated topology.
    ///
    /// Added/changed names the generator does not know are dropped with a
    /// warning — the supervisor tracks a config file this run just wrote, so
    /// a mismatch means someone edited it out-of-band.
    pub fn from_reload(outcome: &ReloadOutcome, new_specs: &[ProcessGroupSpec]) -> Self {
        let by_name: BTreeMap<&str, &ProcessGroupSpec> = new_specs
            .iter()
            .map(|s| (s.group_name.as_str(), s))
            .collect();

        let resolve = |names: &[String]| -> Vec<ProcessGroupSpec> {
            names
                .iter()
                .filter_map(|name| match by_name.get(name.as_str()) {
                    Some(spec) => Some((*spec).clone()),
                    None => {
                        tracing::warn!("supervisor reported unknown group '{name}'; skipping");
                        None
                    }
                })
                .collect()
        };

        let mut removed = outcome.removed.clone();
        removed.sort();

        TopologyDiff {
            added: resolve(&outcome.added),
            changed: resolve(&outcome.changed),
            removed,
        }
    }
}

/// Structural diff of two topologies, keyed by group name.
///
/// Groups present only in `old` are removed; only in `new` are added;
/// present in both with any field differing are changed; identical specs are
/// omitted entirely so steady state never restarts anything.
pub fn diff(old: &[ProcessGroupSpec], new: &[ProcessGroupSpec]) -> TopologyDiff {
    let old_by_name: BTreeMap<&str, &ProcessGroupSpec> =
        old.iter().map(|s| (s.group_name.as_str(), s)).collect();
    let new_by_name: BTreeMap<&str, &ProcessGroupSpec> =
        new.iter().map(|s| (s.group_name.as_str(), s)).collect();

    let mut result = TopologyDiff::default();

    for (name, new_spec) in &new_by_name {
        match old_by_name.get(name) {
            None => result.added.push((*new_spec).clone()),
            Some(old_spec) if old_spec != new_spec => result.changed.push((*new_spec).clone()),
            Some(_) => {}
        }
    }

    for name in old_by_name.keys() {
        if !new_by_name.contains_key(name) {
            result.removed.push((*name).to_string());
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Artifact text diffs (offline preview)
// ---------------------------------------------------------------------------

/// A single rendered artifact diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Compare rendered artifacts against current on-disk content.
///
/// No files are written. Unchanged artifacts are omitted.
pub fn diff_artifacts(artifacts: &[(PathBuf, &str)]) -> Result<Vec<FileDiff>, SyncError> {
    let mut diffs = Vec::new();

    for (path, rendered) in artifacts {
        let rendered = normalize_line_endings(rendered);
        let existing = read_existing_or_empty(path)?;
        if existing == rendered {
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let old_header = format!("a/{name}");
        let new_header = format!("b/{name}");
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path: path.clone(),
            unified_diff: unified,
        });
    }

    Ok(diffs)
}

fn read_existing_or_empty(path: &Path) -> Result<String, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_line_endings(&content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
