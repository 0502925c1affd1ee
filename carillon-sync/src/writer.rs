//! Hash-gated atomic artifact writer.
//!
//! ## `atomic_write` protocol
//!
//! 1. Normalise line endings to LF.
//! 2. SHA-256 hash the content.
//! 3. Compare with the stored hash → skip if identical.
//! 4. Write to `<path>.carillon.tmp`.
//! 5. Rename to the final path (atomic on POSIX).
//! 6. Update the hash store entry (caller saves the store).
//!
//! Consumers of the generated configs never observe a partial file: they see
//! either the previous content or the fully renamed replacement.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};
use crate::hash_store::{self, HashStore};

/// Outcome of an individual artifact write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — rendered content matches the stored hash.
    Unchanged { path: PathBuf },
}

/// Atomically write a single artifact and update the hash store.
///
/// The caller loads the store beforehand and saves it after all artifacts of
/// a run are processed.
pub(crate) fn atomic_write(
    path: &Path,
    content: &str,
    store: &mut HashStore,
) -> Result<WriteResult, SyncError> {
    let normalized = content.replace("\r\n", "\n");
    let content = normalized.as_str();

    let digest = {
        let mut h = Sha256::new();
        h.update(content.as_bytes());
        hex::encode(h.finalize())
    };

    let key = path.to_string_lossy().to_string();
    if store.get(&key) == Some(&digest) && path.exists() {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = PathBuf::from(format!("{}.carillon.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }

    store.insert(key, digest);
    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Write every artifact of a run, with one hash-store load/save around the
/// batch. Fails on the first write error — artifact writes are fatal to the
/// run, and the atomic rename guarantees nothing half-written is visible.
pub fn write_artifacts(
    state_dir: &Path,
    artifacts: &[(PathBuf, &str)],
) -> Result<Vec<WriteResult>, SyncError> {
    let mut store = hash_store::load(state_dir)?;
    let mut results = Vec::with_capacity(artifacts.len());

    for (path, content) in artifacts {
        results.push(atomic_write(path, content, &mut store.files)?);
    }

    if results
        .iter()
        .any(|r| matches!(r, WriteResult::Written { .. }))
    {
        store.synced_at = Utc::now();
    }
    hash_store::save(state_dir, &store)?;

    Ok(results)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
