//! HTTP server configuration settings.

use std::{borrow::Cow, net::SocketAddr};

use serde::Deserialize;

use crate::HealthConfig;

/// HTTP server configuration settings.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The socket address the server should listen on.
    pub listen_address: Option<SocketAddr>,
    /// Authentication endpoint the proxy calls for every new connection.
    #[serde(default)]
    pub auth: AuthEndpointConfig,
    /// Health endpoint configuration.
    #[serde(default)]
    pub health: HealthConfig,
}

/// Authentication endpoint configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthEndpointConfig {
    /// The path the proxy posts authentication requests to.
    pub path: Cow<'static, str>,
}

impl Default for AuthEndpointConfig {
    fn default() -> Self {
        Self {
            path: Cow::Borrowed("/auth"),
        }
    }
}
