//! Configuration structures to map the panel-auth.toml configuration.

#![deny(missing_docs)]

mod health;
mod loader;
mod server;
mod user_sync;

use std::path::Path;

pub use health::HealthConfig;
pub use server::{AuthEndpointConfig, ServerConfig};
pub use user_sync::{KickConfig, UserSyncConfig};
use serde::Deserialize;

/// Main configuration structure for the panel-auth service.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// User list synchronization settings.
    pub user_sync: Option<UserSyncConfig>,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        loader::load(path)
    }

    /// Validates that user synchronization is configured with sane values.
    pub fn validate(&self) -> anyhow::Result<()> {
        loader::validate(self)
    }
}
