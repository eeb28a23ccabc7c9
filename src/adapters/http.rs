//! Shared blocking HTTP helpers for the network adapters.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("coinlens/", env!("CARGO_PKG_VERSION"));

/// Blocking client with the configured request timeout.
pub fn build_client(timeout_secs: u64) -> Result<Client, String> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| format!("failed to build HTTP client: {}", e))
}

/// GET `url` and return the body of a 2xx response.
///
/// `label` names the request in logs only; query strings carry API keys, so
/// the full URL is logged at debug level.
pub fn get_text(client: &Client, label: &str, url: &str) -> Result<String, String> {
    debug!(%label, %url, "GET");
    let response = client.get(url).send().map_err(|e| {
        warn!(%label, error = %e, "request failed");
        format!("{} request failed: {}", label, e)
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!(%label, %status, "non-success status");
        return Err(format!("{} returned HTTP {}", label, status));
    }

    response
        .text()
        .map_err(|e| format!("{} response unreadable: {}", label, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_timeout() {
        assert!(build_client(5).is_ok());
    }

    #[test]
    fn user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("coinlens/"));
    }
}
