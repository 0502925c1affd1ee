pub mod cert;
pub mod diff;
pub mod nowplaying;
pub mod status;
pub mod update;

use anyhow::{bail, Result};

use carillon_core::Environment;

/// Parent credentials are required before any command that talks upstream.
pub(crate) fn require_parent(env: &Environment) -> Result<(String, String)> {
    match (&env.parent_base_url, &env.parent_api_key) {
        (Some(url), Some(key)) => Ok((url.clone(), key.clone())),
        _ => bail!(
            "parent base URL or API key is not configured; \
             set CARILLON_PARENT_BASE_URL and CARILLON_PARENT_API_KEY"
        ),
    }
}
