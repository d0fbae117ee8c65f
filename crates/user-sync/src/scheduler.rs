//! Drives the fetch and reconcile cycle on a fixed interval.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::SyncError,
    fetcher::UserSource,
    reconcile::{ReconcileReport, reconcile},
    revocation::RevocationSink,
    store::SnapshotStore,
};

/// Observable state of the synchronization loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// When the last fetch succeeded and its snapshot was installed.
    pub last_success: Option<Timestamp>,
    /// Number of users in the snapshot installed by the last success.
    pub users: usize,
    /// Failed fetches since the last success.
    pub consecutive_failures: u32,
    /// Message of the most recent failure, cleared on success.
    pub last_error: Option<String>,
}

/// Keeps a [`SnapshotStore`] in sync with a [`UserSource`].
pub struct UserSync<S> {
    source: S,
    store: Arc<SnapshotStore>,
    sink: Option<Arc<dyn RevocationSink>>,
    interval: Duration,
    status: watch::Sender<SyncStatus>,
}

impl<S: UserSource> UserSync<S> {
    /// Creates a synchronizer without a revocation sink. Removed users are
    /// dropped from the snapshot but nobody is kicked.
    pub fn new(source: S, store: Arc<SnapshotStore>, interval: Duration) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());

        Self {
            source,
            store,
            sink: None,
            interval,
            status,
        }
    }

    /// Reports users that vanish from the panel to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn RevocationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Subscribes to status updates. Valid before and after [`UserSync::start`].
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Fetches once and, on success, installs the result.
    ///
    /// A failed fetch leaves the live snapshot untouched.
    pub async fn run_once(&self) -> Result<ReconcileReport, SyncError> {
        match self.source.fetch().await {
            Ok(users) => {
                let report = reconcile(&self.store, users, self.sink.as_deref());

                self.status.send_modify(|status| {
                    status.last_success = Some(Timestamp::now());
                    status.users = report.users;
                    status.consecutive_failures = 0;
                    status.last_error = None;
                });

                log::debug!("Installed user snapshot with {} users", report.users);

                Ok(report)
            }
            Err(error) => {
                self.status.send_modify(|status| {
                    status.consecutive_failures = status.consecutive_failures.saturating_add(1);
                    status.last_error = Some(error.to_string());
                });

                Err(error)
            }
        }
    }

    /// Runs the first cycle, then keeps refreshing in a background task.
    ///
    /// The first cycle is awaited. If it fails the error is returned and no
    /// task is spawned. Later failures are logged and retried on the next
    /// tick. The task stops when `shutdown` is cancelled.
    pub async fn start(self, shutdown: CancellationToken) -> Result<SyncHandle, SyncError> {
        log::info!("User list synchronization active, refreshing every {:?}", self.interval);

        self.run_once().await?;

        let status = self.status();
        let token = shutdown.clone();
        let task = tokio::spawn(async move { self.run(token).await });

        Ok(SyncHandle { task, shutdown, status })
    }

    async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = self.run_once() => result,
            };

            if let Err(error) = result {
                log::warn!("Failed to refresh the user list, keeping the previous snapshot: {error}");
            }
        }

        log::debug!("User list synchronization stopped");
    }
}

/// Handle to the background refresh task.
pub struct SyncHandle {
    task: JoinHandle<()>,
    shutdown: CancellationToken,
    status: watch::Receiver<SyncStatus>,
}

impl SyncHandle {
    /// The latest status of the loop.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Stops the loop and waits for the task to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();

        if let Err(error) = self.task.await {
            log::error!("User list synchronization task failed: {error}");
        }
    }
}
