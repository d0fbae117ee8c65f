mod panel;
mod traffic;

use std::net::SocketAddr;
use std::time::Duration;

use config::Config;
use serde_json::json;
use server::ServeConfig;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

pub use panel::MockPanel;
pub use traffic::{KickRequest, MockTrafficApi};

/// Test client for making HTTP requests to the test server
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a POST request to the given path with JSON body
    pub async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    /// Authenticate `auth` the way the proxy does on `/auth`, returning the response body
    pub async fn authenticate(&self, auth: &str) -> serde_json::Value {
        let body = json!({ "addr": "192.0.2.10:52100", "auth": auth, "tx": 0 });
        let response = self.post("/auth", &body).await.unwrap();

        assert_eq!(response.status(), 200);

        response.json().await.unwrap()
    }
}

/// Test server that manages the lifecycle of a server instance
pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    shutdown: CancellationToken,
}

impl TestServer {
    /// Start a new test server with the given TOML configuration
    pub async fn start(config_toml: &str) -> Self {
        let config: Config = toml::from_str(config_toml).unwrap();

        // Find an available port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let serve_config = ServeConfig {
            listen_address: address,
            config,
        };

        let shutdown = CancellationToken::new();
        let mut handle = tokio::spawn(server::serve_until(serve_config, shutdown.clone()));

        // The server binds only after the first user list fetch.
        let mut retries = 100;

        while TcpStream::connect(address).await.is_err() {
            if handle.is_finished() {
                let result = (&mut handle).await.unwrap();
                unreachable!("server exited before listening on {address}: {result:?}");
            }

            assert!(retries > 0, "server did not start listening on {address}");
            retries -= 1;

            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestServer {
            client: TestClient::new(format!("http://{address}")),
            address,
            shutdown,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Polls `condition` until it holds, giving up after five seconds
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    assert!(result.is_ok(), "condition not met within five seconds");
}

/// Configuration syncing from `panel` every 100ms without a kick endpoint
pub fn panel_config(panel: &MockPanel) -> String {
    indoc::formatdoc! {r#"
        [user_sync]
        url = "{url}"
        interval = "100ms"
        timeout = "1s"
    "#, url = panel.url()}
}

/// Configuration syncing from `panel` every 100ms and kicking through `traffic`
pub fn kick_config(panel: &MockPanel, traffic: &MockTrafficApi, secret: &str) -> String {
    indoc::formatdoc! {r#"
        [user_sync]
        url = "{panel_url}"
        interval = "100ms"
        timeout = "1s"

        [user_sync.kick]
        url = "{kick_url}"
        secret = "{secret}"
    "#, panel_url = panel.url(), kick_url = traffic.url()}
}
