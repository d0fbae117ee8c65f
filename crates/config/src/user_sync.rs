//! Panel user list synchronization settings.

use std::time::Duration;

use duration_str::deserialize_duration;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Where and how often to fetch the user list, and what to do with removed users.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSyncConfig {
    /// The panel endpoint returning `{"users": [...]}`. Usually carries the node token in the query.
    pub url: Url,
    /// Time between two fetches. The first fetch happens at startup.
    #[serde(deserialize_with = "deserialize_duration", default = "default_interval")]
    pub interval: Duration,
    /// Upper bound for a single fetch, connect and body included.
    #[serde(deserialize_with = "deserialize_duration", default = "default_timeout")]
    pub timeout: Duration,
    /// Responses with a larger body are rejected.
    #[serde(default = "default_max_response_size")]
    pub max_response_size: usize,
    /// Log every removed user when no kick endpoint is configured.
    #[serde(default = "default_log_revocations")]
    pub log_revocations: bool,
    /// Traffic stats endpoint of the proxy used to kick removed users.
    pub kick: Option<KickConfig>,
}

/// The proxy's kick endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KickConfig {
    /// Full URL of the kick endpoint, e.g. `http://127.0.0.1:9999/kick`.
    pub url: Url,
    /// Sent verbatim in the `Authorization` header.
    pub secret: Option<SecretString>,
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_response_size() -> usize {
    16 * 1024 * 1024
}

fn default_log_revocations() -> bool {
    true
}
