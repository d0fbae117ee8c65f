//! Revocation sinks receive the ids of users that vanished from the panel.

/// Receives one call per user that disappeared between two snapshots.
///
/// Calls happen while the snapshot store is locked for writing, so an
/// implementation must return quickly and must not perform blocking I/O.
pub trait RevocationSink: Send + Sync {
    /// Requests that all sessions of the user with this decimal id are terminated.
    fn kick(&self, id: &str);
}

/// A sink that only records revocations in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RevocationSink for LogSink {
    fn kick(&self, id: &str) {
        log::info!("User {id} was removed from the panel, kicking");
    }
}
