//! Scoped HTTP-01 challenge publication.
//!
//! Challenge files exist only for the duration of one issuance attempt. The
//! responder records every file it writes and removes them all when it is
//! retracted or dropped, so no stale token survives an error, an early
//! return or a panic. Cleanup is idempotent when a file is already gone.

use std::path::{Path, PathBuf};

use crate::engine::{ChallengePublisher, EngineError};
use crate::error::AcmeError;

/// Publishes challenge files under a well-known directory and guarantees
/// their retraction on every exit path.
#[derive(Debug)]
pub struct ChallengeResponder {
    dir: PathBuf,
    published: Vec<PathBuf>,
}

impl ChallengeResponder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ChallengeResponder {
            dir: dir.into(),
            published: Vec::new(),
        }
    }

    /// Path a token is served from. Only the token's final path component is
    /// used, so a hostile token cannot escape the challenge directory.
    fn token_path(&self, token: &str) -> Result<PathBuf, AcmeError> {
        let name = Path::new(token)
            .file_name()
            .ok_or_else(|| AcmeError::InvalidToken {
                token: token.to_owned(),
            })?;
        Ok(self.dir.join(name))
    }

    /// Remove every file published so far. Safe to call repeatedly; also
    /// runs on drop as a backstop.
    pub fn retract_all(&mut self) {
        for path in self.published.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    // Cleanup failure must not fail issuance; the certificate
                    // may already be valid at this point.
                    tracing::warn!("could not retract challenge {}: {err}", path.display());
                }
            }
        }
    }
}

impl ChallengePublisher for ChallengeResponder {
    fn publish(&mut self, token: &str, value: &str) -> Result<(), EngineError> {
        let path = self
            .token_path(token)
            .map_err(|e| EngineError::new(e.to_string()))?;
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| EngineError::new(format!("{}: {e}", self.dir.display())))?;
        std::fs::write(&path, value)
            .map_err(|e| EngineError::new(format!("{}: {e}", path.display())))?;
        self.published.push(path);
        Ok(())
    }
}

impl Drop for ChallengeResponder {
    fn drop(&mut self) {
        self.retract_all();
    }
}

/// Run `f` with `token` published under `dir`; the file is gone once this
/// returns, on the normal path and on unwind alike.
pub fn with_challenge<T>(
    dir: &Path,
    token: &str,
    value: &str,
    f: impl FnOnce() -> T,
) -> Result<T, AcmeError> {
    let mut responder = ChallengeResponder::new(dir);
    responder.publish(token, value)?;
    Ok(f())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn publish_writes_and_retract_removes() {
        let tmp = TempDir::new().expect("tempdir");
        let mut responder = ChallengeResponder::new(tmp.path());
        responder.publish("tok-1", "proof-1").expect("publish");

        let path = tmp.path().join("tok-1");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "proof-1");

        responder.retract_all();
        assert!(!path.exists());
    }

    #[test]
    fn drop_retracts_outstanding_files() {
        let tmp = TempDir::new().expect("tempdir");
        {
            let mut responder = ChallengeResponder::new(tmp.path());
            responder.publish("tok-a", "a").expect("publish a");
            responder.publish("tok-b", "b").expect("publish b");
        }
        assert!(!tmp.path().join("tok-a").exists());
        assert!(!tmp.path().join("tok-b").exists());
    }

    #[test]
    fn retraction_is_idempotent_when_file_already_gone() {
        let tmp = TempDir::new().expect("tempdir");
        let mut responder = ChallengeResponder::new(tmp.path());
        responder.publish("tok-1", "x").expect("publish");
        std::fs::remove_file(tmp.path().join("tok-1")).expect("external removal");
        responder.retract_all();
    }

    #[test]
    fn token_reduces_to_its_final_component() {
        let tmp = TempDir::new().expect("tempdir");
        let mut responder = ChallengeResponder::new(tmp.path().join("challenges"));
        responder
            .publish("../../etc/escape", "nope")
            .expect("basename is still usable");
        assert!(tmp.path().join("challenges").join("escape").exists());
        assert!(!tmp.path().join("etc").exists());
    }

    #[test]
    fn with_challenge_cleans_up_on_normal_return() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("tok");
        let seen = with_challenge(tmp.path(), "tok", "v", || path.exists()).expect("scope");
        assert!(seen, "file must exist inside the scope");
        assert!(!path.exists(), "file must be gone after the scope");
    }

    #[test]
    fn with_challenge_cleans_up_on_panic() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("tok");

        let result = catch_unwind(AssertUnwindSafe(|| {
            with_challenge(tmp.path(), "tok", "v", || panic!("induced"))
        }));
        assert!(result.is_err());
        assert!(!path.exists(), "file must be gone after unwind");
    }
}
