use std::{net::SocketAddr, sync::Arc};

use axum::{Json, extract::State};
use serde::Deserialize;
use user_sync::{Authentication, Authenticator};

/// Body the proxy posts for every new connection.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthRequest {
    /// Remote address of the connecting client.
    addr: SocketAddr,
    /// The credential the client presented.
    auth: String,
    /// Bandwidth announced by the client, in bytes per second.
    #[serde(default)]
    tx: u64,
}

/// Handles the proxy's authentication callback.
pub(crate) async fn authenticate(
    State(authenticator): State<Arc<dyn Authenticator>>,
    Json(request): Json<AuthRequest>,
) -> Json<Authentication> {
    Json(authenticator.authenticate(request.addr, &request.auth, request.tx))
}
