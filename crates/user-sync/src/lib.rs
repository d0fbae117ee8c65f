//! Remote user list synchronization for the proxy authentication path.
//!
//! This crate keeps an in-memory snapshot of the users a management panel
//! allows on this node:
//! - the user list is fetched periodically from the panel over HTTP
//! - every successful fetch replaces the snapshot as a whole
//! - users that disappeared from the list are reported to a revocation sink
//!   before the new snapshot becomes visible
//! - credential lookups are served synchronously from the live snapshot

#![deny(missing_docs)]

mod authenticator;
mod error;
mod fetcher;
mod identity;
mod reconcile;
mod revocation;
mod scheduler;
mod store;

pub use authenticator::{Authentication, Authenticator, SnapshotAuthenticator};
pub use error::SyncError;
pub use fetcher::{HttpUserSource, UserSource};
pub use identity::{Identity, Snapshot, UserList};
pub use reconcile::{ReconcileReport, reconcile};
pub use revocation::{LogSink, RevocationSink};
pub use scheduler::{SyncHandle, SyncStatus, UserSync};
pub use store::SnapshotStore;
