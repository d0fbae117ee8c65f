use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{Json, Router, extract::State, routing::post};
use http::HeaderMap;
use tokio::net::TcpListener;

/// A request received on the kick endpoint
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct KickRequest {
    pub authorization: Option<String>,
    pub ids: Vec<String>,
}

/// Mock of the proxy's traffic stats API, recording kick requests
pub struct MockTrafficApi {
    address: SocketAddr,
    kicks: Arc<Mutex<Vec<KickRequest>>>,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl MockTrafficApi {
    pub async fn start() -> Self {
        let kicks = Arc::new(Mutex::new(Vec::new()));

        async fn handle_kick(
            State(kicks): State<Arc<Mutex<Vec<KickRequest>>>>,
            headers: HeaderMap,
            Json(ids): Json<Vec<String>>,
        ) {
            let authorization = headers
                .get(http::header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);

            kicks.lock().unwrap().push(KickRequest { authorization, ids });
        }

        let app = Router::new().route("/kick", post(handle_kick)).with_state(kicks.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            address,
            kicks,
            _server_handle: server_handle,
        }
    }

    /// All kick requests received so far
    pub fn kicks(&self) -> Vec<KickRequest> {
        self.kicks.lock().unwrap().clone()
    }

    /// Every id kicked so far, in arrival order
    pub fn kicked_ids(&self) -> Vec<String> {
        self.kicks().into_iter().flat_map(|kick| kick.ids).collect()
    }

    pub fn url(&self) -> String {
        format!("http://{}/kick", self.address)
    }
}
