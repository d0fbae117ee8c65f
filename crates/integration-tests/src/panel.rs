use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{Router, extract::State, routing::get};
use http::{StatusCode, header};
use serde_json::json;
use tokio::net::TcpListener;

struct PanelState {
    response: Mutex<(StatusCode, String)>,
    requests: AtomicUsize,
}

/// Mock panel serving the node's user list
pub struct MockPanel {
    address: SocketAddr,
    state: Arc<PanelState>,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl MockPanel {
    /// Start a mock panel returning `users` as the user list
    pub async fn start(users: serde_json::Value) -> Self {
        let state = Arc::new(PanelState {
            response: Mutex::new((StatusCode::OK, json!({ "users": users }).to_string())),
            requests: AtomicUsize::new(0),
        });

        async fn handle_users(State(state): State<Arc<PanelState>>) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
            state.requests.fetch_add(1, Ordering::SeqCst);
            let (status, body) = state.response.lock().unwrap().clone();

            (status, [(header::CONTENT_TYPE, "application/json")], body)
        }

        let app = Router::new()
            .route("/api/v1/server/UniProxy/user", get(handle_users))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            address,
            state,
            _server_handle: server_handle,
        }
    }

    /// Serve `users` from now on
    pub fn set_users(&self, users: serde_json::Value) {
        *self.state.response.lock().unwrap() = (StatusCode::OK, json!({ "users": users }).to_string());
    }

    /// Answer every request with `status` from now on
    pub fn fail_with(&self, status: StatusCode) {
        *self.state.response.lock().unwrap() = (status, String::from("panel unavailable"));
    }

    /// Serve `body` verbatim with a success status
    pub fn set_raw_body(&self, body: &str) {
        *self.state.response.lock().unwrap() = (StatusCode::OK, body.to_string());
    }

    /// Number of user list requests received so far
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// The user list URL, with the node credentials in the query like a real panel expects
    pub fn url(&self) -> String {
        format!(
            "http://{}/api/v1/server/UniProxy/user?node_id=1&node_type=hysteria&token=test",
            self.address
        )
    }
}
