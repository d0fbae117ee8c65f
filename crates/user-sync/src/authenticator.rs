//! The lookup the proxy performs for every new connection.

use std::{net::SocketAddr, sync::Arc};

use serde::Serialize;

use crate::store::SnapshotStore;

/// Answer to an authentication request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Authentication {
    /// Whether the connection may proceed.
    pub ok: bool,
    /// The user's numeric id as a string, empty when denied.
    pub id: String,
}

impl Authentication {
    /// A successful authentication for the user with this id.
    pub fn allowed(id: i64) -> Self {
        Self {
            ok: true,
            id: id.to_string(),
        }
    }

    /// A rejected authentication.
    pub fn denied() -> Self {
        Self::default()
    }
}

/// Decides whether a connecting client may use the proxy.
///
/// Called concurrently from every connection handler.
pub trait Authenticator: Send + Sync {
    /// Checks `auth`, the credential the client presented.
    ///
    /// `addr` is the remote address of the client and `tx` the bandwidth the
    /// client announced; neither affects the decision.
    fn authenticate(&self, addr: SocketAddr, auth: &str, tx: u64) -> Authentication;
}

/// Authenticates against the live snapshot of a [`SnapshotStore`].
#[derive(Debug, Clone)]
pub struct SnapshotAuthenticator {
    store: Arc<SnapshotStore>,
}

impl SnapshotAuthenticator {
    /// Creates an authenticator reading from `store`.
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }
}

impl Authenticator for SnapshotAuthenticator {
    fn authenticate(&self, addr: SocketAddr, auth: &str, _tx: u64) -> Authentication {
        match self.store.lookup(auth) {
            Some(user) => {
                log::debug!("Accepted user {} from {addr}", user.id);
                Authentication::allowed(user.id)
            }
            None => {
                log::debug!("Rejected unknown credential from {addr}");
                Authentication::denied()
            }
        }
    }
}
