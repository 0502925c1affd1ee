//! Hash store — SHA-256-based idempotency tracking for written artifacts.
//!
//! Persists a `HashStoreFile` JSON document at `<state_dir>/hashes.json`.
//! Writes use the same atomic `.tmp` + rename pattern as every artifact.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};

/// In-memory hash store: maps artifact path strings to their last written
/// SHA-256 hex digest.
pub type HashStore = HashMap<String, String>;

/// On-disk hash store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashStoreFile {
    pub synced_at: DateTime<Utc>,
    pub files: HashStore,
}

/// `<state_dir>/hashes.json` — pure, no I/O.
pub fn store_path(state_dir: &Path) -> PathBuf {
    state_dir.join("hashes.json")
}

/// Load the node's hash store; an absent file is an empty store.
pub fn load(state_dir: &Path) -> Result<HashStoreFile, SyncError> {
    let path = store_path(state_dir);
    if !path.exists() {
        return Ok(HashStoreFile {
            synced_at: Utc::now(),
            files: HashMap::new(),
        });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save the hash store atomically.
pub fn save(state_dir: &Path, store: &HashStoreFile) -> Result<(), SyncError> {
    let path = store_path(state_dir);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid hash store path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(store)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_store_when_file_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let store = load(tmp.path()).expect("load");
        assert!(store.files.is_empty());
    }

    #[test]
    fn roundtrip_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let mut files = HashMap::new();
        files.insert("/var/carillon/stations/alpha.xml".to_string(), "deadbeef".to_string());
        files.insert("/var/carillon/stations/nginx.conf".to_string(), "cafebabe".to_string());
        let store = HashStoreFile {
            synced_at: Utc::now(),
            files,
        };

        save(tmp.path(), &store).expect("save");
        let loaded = load(tmp.path()).expect("load");
        assert_eq!(loaded.files, store.files);
    }

    #[test]
    fn tmp_file_cleaned_up_after_save() {
        let tmp = TempDir::new().expect("tempdir");
        let store = HashStoreFile {
            synced_at: Utc::now(),
            files: HashMap::new(),
        };
        save(tmp.path(), &store).expect("save");
        assert!(!store_path(tmp.path()).with_extension("json.tmp").exists());
    }
}
