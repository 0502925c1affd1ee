//! HTTP client for the parent installation's admin API.

use std::time::Duration;

use serde_json::Value;

use carillon_core::RelayDefinition;
use carillon_sync::{FetchError, FleetRegistry};

/// Thin ureq wrapper around the two admin endpoints the node consumes.
pub struct ParentApi {
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl ParentApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        ParentApi {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(30))
                .build(),
        }
    }

    fn relays_url(&self) -> String {
        format!("{}/api/admin/relays", self.base_url)
    }

    /// Push aggregated now-playing data back to the parent.
    pub fn update_relays(&self, payload: &Value) -> Result<(), FetchError> {
        self.agent
            .put(&self.relays_url())
            .set("X-API-Key", &self.api_key)
            .send_json(payload)
            .map_err(|e| FetchError(e.to_string()))?;
        Ok(())
    }
}

impl FleetRegistry for ParentApi {
    fn list_relays(&mut self) -> Result<Vec<RelayDefinition>, FetchError> {
        let response = self
            .agent
            .get(&self.relays_url())
            .set("X-API-Key", &self.api_key)
            .call()
            .map_err(|e| FetchError(e.to_string()))?;
        response.into_json().map_err(|e| FetchError(e.to_string()))
    }
}

/// Fetch one relay's local status document.
pub fn local_status(port: u16) -> Result<Value, FetchError> {
    let url = format!("http://127.0.0.1:{port}/status-json.xsl");
    let response = ureq::get(&url)
        .timeout(Duration::from_secs(5))
        .call()
        .map_err(|e| FetchError(e.to_string()))?;
    response.into_json().map_err(|e| FetchError(e.to_string()))
}
