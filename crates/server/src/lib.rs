//! panel-auth server library.
//!
//! Provides a reusable server function to serve panel-auth either for the binary, or for the integration tests.

#![deny(missing_docs)]

mod auth;
mod health;
mod kick;

use std::{net::SocketAddr, sync::Arc};

use anyhow::anyhow;
use axum::{
    Router,
    routing::{get, post},
};
use config::{Config, KickConfig, UserSyncConfig};
use kick::HttpKickSink;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use user_sync::{
    Authenticator, HttpUserSource, LogSink, RevocationSink, SnapshotAuthenticator, SnapshotStore, SyncHandle,
    SyncStatus, UserSync,
};

/// Configuration for serving panel-auth.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized panel-auth TOML configuration.
    pub config: Config,
}

/// Starts panel-auth and runs it until the process receives Ctrl-C.
pub async fn serve(serve_config: ServeConfig) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::info!("Received Ctrl-C, shutting down"),
            Err(e) => log::error!("Failed to listen for Ctrl-C: {e}"),
        }

        signal.cancel();
    });

    serve_until(serve_config, shutdown).await
}

/// Starts panel-auth and runs it until `shutdown` is cancelled.
///
/// The first user list fetch happens before the listener accepts requests. If
/// it fails, the server still starts, but user synchronization stays disabled
/// and every authentication is rejected.
pub async fn serve_until(ServeConfig { listen_address, config }: ServeConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    let user_sync = config
        .user_sync
        .as_ref()
        .ok_or_else(|| anyhow!("The [user_sync] section is missing from the configuration"))?;

    let store = Arc::new(SnapshotStore::new());
    let (sync, status) = start_user_sync(user_sync, store.clone(), shutdown.clone()).await?;

    let authenticator: Arc<dyn Authenticator> = Arc::new(SnapshotAuthenticator::new(store));

    let mut app = Router::new().route(&config.server.auth.path, post(auth::authenticate).with_state(authenticator));

    if config.server.health.enabled {
        app = app.route(&config.server.health.path, get(health::health).with_state(status));
    }

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    log::info!("Authentication endpoint available at: http://{listen_address}{}", config.server.auth.path);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server: {e}"));

    shutdown.cancel();

    if let Some(sync) = sync {
        sync.shutdown().await;
    }

    result
}

async fn start_user_sync(
    config: &UserSyncConfig,
    store: Arc<SnapshotStore>,
    shutdown: CancellationToken,
) -> anyhow::Result<(Option<SyncHandle>, tokio::sync::watch::Receiver<SyncStatus>)> {
    let source = HttpUserSource::new(config)?;
    let mut sync = UserSync::new(source, store, config.interval);

    if let Some(sink) = revocation_sink(config, shutdown.clone())? {
        sync = sync.with_sink(sink);
    }

    let status = sync.status();

    match sync.start(shutdown).await {
        Ok(handle) => Ok((Some(handle), status)),
        Err(e) => {
            log::error!("Initial user list fetch failed, user synchronization is disabled: {e}");
            Ok((None, status))
        }
    }
}

/// How users removed from the panel are revoked.
#[derive(Debug)]
enum RevocationMode<'a> {
    /// Forward removed ids to the proxy's kick endpoint.
    Kick(&'a KickConfig),
    /// Only log removed ids.
    Log,
    /// Skip the diff entirely.
    Off,
}

impl<'a> RevocationMode<'a> {
    fn from_config(config: &'a UserSyncConfig) -> Self {
        match &config.kick {
            Some(kick) => Self::Kick(kick),
            None if config.log_revocations => Self::Log,
            None => Self::Off,
        }
    }
}

fn revocation_sink(config: &UserSyncConfig, shutdown: CancellationToken) -> anyhow::Result<Option<Arc<dyn RevocationSink>>> {
    match RevocationMode::from_config(config) {
        RevocationMode::Kick(kick) => {
            log::debug!("Kicking removed users through {}", kick.url);
            Ok(Some(Arc::new(HttpKickSink::spawn(kick, config.timeout, shutdown)?)))
        }
        RevocationMode::Log => Ok(Some(Arc::new(LogSink))),
        RevocationMode::Off => {
            log::warn!("No kick endpoint configured and revocation logging is off, removed users keep their sessions");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn user_sync(kick: Option<KickConfig>, log_revocations: bool) -> UserSyncConfig {
        UserSyncConfig {
            url: "http://127.0.0.1:7000/users".parse().unwrap(),
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
            max_response_size: 1024,
            log_revocations,
            kick,
        }
    }

    fn kick() -> KickConfig {
        KickConfig {
            url: "http://127.0.0.1:9999/kick".parse().unwrap(),
            secret: Some(SecretString::from("hunter2".to_string())),
        }
    }

    #[tokio::test]
    async fn kick_endpoint_takes_precedence_over_logging() {
        for log_revocations in [true, false] {
            let config = user_sync(Some(kick()), log_revocations);

            assert!(matches!(
                RevocationMode::from_config(&config),
                RevocationMode::Kick(kick) if kick.url.as_str() == "http://127.0.0.1:9999/kick"
            ));

            let shutdown = CancellationToken::new();
            assert!(revocation_sink(&config, shutdown.clone()).unwrap().is_some());
            shutdown.cancel();
        }
    }

    #[tokio::test]
    async fn logging_sink_without_kick_endpoint() {
        let config = user_sync(None, true);

        assert!(matches!(RevocationMode::from_config(&config), RevocationMode::Log));
        assert!(revocation_sink(&config, CancellationToken::new()).unwrap().is_some());
    }

    #[tokio::test]
    async fn no_sink_when_logging_is_off() {
        let config = user_sync(None, false);

        assert!(matches!(RevocationMode::from_config(&config), RevocationMode::Off));
        assert!(revocation_sink(&config, CancellationToken::new()).unwrap().is_none());
    }
}
