//! Local JSON snapshots: the raw relay list and the last-applied topology.
//!
//! # Storage layout
//!
//! ```text
//! <stations_dir>/stations.json   raw relay records, overwritten each run
//! <state_dir>/groups.json        ProcessGroupSpec[] applied by the last run
//! ```
//!
//! Both files are plain data for offline consumers (`status`, `diff`,
//! `nowplaying`); reconciliation never treats them as live state. Writes use
//! the same atomic `.tmp` + rename pattern as every other artifact.

use std::path::{Path, PathBuf};

use crate::error::{io_err, CoreError};
use crate::types::{ProcessGroupSpec, RelayDefinition};

/// `<stations_dir>/stations.json` — pure, no I/O.
pub fn relays_path(stations_dir: &Path) -> PathBuf {
    stations_dir.join("stations.json")
}

/// `<state_dir>/groups.json` — pure, no I/O.
pub fn groups_path(state_dir: &Path) -> PathBuf {
    state_dir.join("groups.json")
}

/// Overwrite the relay snapshot wholesale.
pub fn save_relays(stations_dir: &Path, relays: &[RelayDefinition]) -> Result<(), CoreError> {
    write_json(&relays_path(stations_dir), relays)
}

/// Load the relay snapshot.
///
/// Returns [`CoreError::SnapshotNotFound`] when no run has persisted one yet;
/// callers surface that as "run `carillon update` first".
pub fn load_relays(stations_dir: &Path) -> Result<Vec<RelayDefinition>, CoreError> {
    let path = relays_path(stations_dir);
    if !path.exists() {
        return Err(CoreError::SnapshotNotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Overwrite the topology snapshot wholesale.
pub fn save_groups(state_dir: &Path, groups: &[ProcessGroupSpec]) -> Result<(), CoreError> {
    write_json(&groups_path(state_dir), groups)
}

/// Load the topology applied by the previous run.
///
/// A missing file is an empty topology, not an error — the first run has
/// nothing to compare against.
pub fn load_groups(state_dir: &Path) -> Result<Vec<ProcessGroupSpec>, CoreError> {
    let path = groups_path(state_dir);
    if !path.exists() {
        return Ok(vec![]);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CoreError> {
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid snapshot path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::types::{Mount, RelayId, RelayType, Shortcode};

    use super::*;

    fn relay(id: &str, port: u16) -> RelayDefinition {
        RelayDefinition {
            id: RelayId::from(id),
            shortcode: Shortcode::from(format!("station-{id}")),
            name: format!("Station {id}"),
            description: String::new(),
            genre: String::new(),
            url: String::new(),
            relay_type: RelayType::ManualRelay,
            port,
            admin_password: "pw".into(),
            relay_password: String::new(),
            mounts: vec![Mount {
                path: "/radio.mp3".into(),
            }],
        }
    }

    #[test]
    fn missing_relay_snapshot_is_an_error() {
        let tmp = TempDir::new().expect("tempdir");
        assert!(matches!(
            load_relays(tmp.path()),
            Err(CoreError::SnapshotNotFound { .. })
        ));
    }

    #[test]
    fn relay_snapshot_roundtrip() {
        let tmp = TempDir::new().expect("tempdir");
        let relays = vec![relay("1", 8000), relay("2", 8010)];
        save_relays(tmp.path(), &relays).expect("save");
        assert_eq!(load_relays(tmp.path()).expect("load"), relays);
    }

    #[test]
    fn relay_snapshot_is_overwritten_wholesale() {
        let tmp = TempDir::new().expect("tempdir");
        save_relays(tmp.path(), &[relay("1", 8000), relay("2", 8010)]).expect("first save");
        save_relays(tmp.path(), &[relay("3", 8020)]).expect("second save");

        let loaded = load_relays(tmp.path()).expect("load");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, RelayId::from("3"));
    }

    #[test]
    fn missing_group_snapshot_is_empty_topology() {
        let tmp = TempDir::new().expect("tempdir");
        assert!(load_groups(tmp.path()).expect("load").is_empty());
    }

    #[test]
    fn group_snapshot_roundtrip() {
        let tmp = TempDir::new().expect("tempdir");
        let groups = vec![ProcessGroupSpec {
            group_name: "station_1".into(),
            program_name: "station_1_relay".into(),
            command: "/usr/local/bin/icecast -c /etc/one.xml".into(),
            directory: PathBuf::from("/etc"),
            stdout_logfile: "/dev/stdout".into(),
            stderr_logfile: "/dev/stderr".into(),
        }];
        save_groups(tmp.path(), &groups).expect("save");
        assert_eq!(load_groups(tmp.path()).expect("load"), groups);
    }

    #[test]
    fn tmp_file_cleaned_up_after_save() {
        let tmp = TempDir::new().expect("tempdir");
        save_relays(tmp.path(), &[relay("1", 8000)]).expect("save");
        assert!(!relays_path(tmp.path()).with_extension("json.tmp").exists());
    }
}
