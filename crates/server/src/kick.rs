//! Forwards revoked users to the proxy's kick endpoint.

use std::time::Duration;

use anyhow::anyhow;
use config::KickConfig;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;
use user_sync::RevocationSink;

/// A [`RevocationSink`] posting removed user ids to the proxy.
///
/// Kicking happens while the snapshot store is locked, so the sink only
/// queues the id. A background task sends everything queued so far as a
/// single JSON array.
#[derive(Debug, Clone)]
pub(crate) struct HttpKickSink {
    sender: mpsc::UnboundedSender<String>,
}

struct KickForwarder {
    client: reqwest::Client,
    url: Url,
    secret: Option<SecretString>,
}

impl HttpKickSink {
    /// Spawns the forwarding task. It runs until `shutdown` is cancelled.
    pub(crate) fn spawn(config: &KickConfig, timeout: Duration, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to build the kick HTTP client: {e}"))?;

        let forwarder = KickForwarder {
            client,
            url: config.url.clone(),
            secret: config.secret.clone(),
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(forwarder.run(receiver, shutdown));

        Ok(Self { sender })
    }
}

impl RevocationSink for HttpKickSink {
    fn kick(&self, id: &str) {
        if self.sender.send(id.to_string()).is_err() {
            log::warn!("Kick forwarder is gone, user {id} stays connected");
        }
    }
}

impl KickForwarder {
    async fn run(self, mut receiver: mpsc::UnboundedReceiver<String>, shutdown: CancellationToken) {
        loop {
            let first = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                id = receiver.recv() => id,
            };

            let Some(first) = first else { break };

            let mut batch = vec![first];

            while let Ok(id) = receiver.try_recv() {
                batch.push(id);
            }

            if let Err(e) = self.send(&batch).await {
                log::error!("Failed to kick users {batch:?}: {e}");
            }
        }

        log::debug!("Kick forwarder stopped");
    }

    async fn send(&self, ids: &[String]) -> Result<(), reqwest::Error> {
        let mut request = self.client.post(self.url.clone()).json(ids);

        if let Some(ref secret) = self.secret {
            request = request.header(http::header::AUTHORIZATION, secret.expose_secret());
        }

        request.send().await?.error_for_status()?;

        log::info!("Kicked {} users: {}", ids.len(), ids.join(", "));

        Ok(())
    }
}
