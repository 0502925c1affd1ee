//! Stable alias → versioned target activation.
//!
//! Downstream consumers (streaming server, proxy) always read fixed alias
//! paths; issuance writes versioned files and re-points the aliases. The old
//! alias is removed before the new one is created so there is never a window
//! with two valid targets — a crash between the two steps leaves a missing
//! alias, which consumers treat the same as "no certificate yet", never a
//! half-written file.

use std::path::Path;

use crate::error::{io_err, AcmeError};

/// Re-point `alias` at `target`.
pub fn repoint(alias: &Path, target: &Path) -> Result<(), AcmeError> {
    match std::fs::remove_file(alias) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(io_err(alias, err)),
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, alias).map_err(|e| io_err(alias, e))?;

    // Platforms without reliable symlinks get a copy; the swap is still
    // whole-file because the old alias was removed first.
    #[cfg(not(unix))]
    std::fs::copy(target, alias).map(|_| ()).map_err(|e| io_err(alias, e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn repoint_creates_alias_to_target() {
        let tmp = TempDir::new().expect("tempdir");
        let target = tmp.path().join("cert-v1.pem");
        std::fs::write(&target, "v1").expect("write target");

        let alias = tmp.path().join("active.pem");
        repoint(&alias, &target).expect("repoint");

        assert_eq!(std::fs::read_to_string(&alias).expect("read"), "v1");
        #[cfg(unix)]
        assert_eq!(std::fs::read_link(&alias).expect("readlink"), target);
    }

    #[test]
    fn repoint_replaces_existing_alias() {
        let tmp = TempDir::new().expect("tempdir");
        let v1 = tmp.path().join("cert-v1.pem");
        let v2 = tmp.path().join("cert-v2.pem");
        std::fs::write(&v1, "v1").expect("write v1");
        std::fs::write(&v2, "v2").expect("write v2");

        let alias = tmp.path().join("active.pem");
        repoint(&alias, &v1).expect("first repoint");
        repoint(&alias, &v2).expect("second repoint");

        assert_eq!(std::fs::read_to_string(&alias).expect("read"), "v2");
        assert_eq!(std::fs::read_to_string(&v1).expect("v1 intact"), "v1");
    }
}
