use http::StatusCode;
use integration_tests::{MockPanel, TestServer, eventually, panel_config};
use serde_json::json;

#[tokio::test]
async fn healthy_after_first_sync() {
    let panel = MockPanel::start(json!([
        { "id": 1, "uuid": "a-a", "speed_limit": null },
        { "id": 2, "uuid": "b-b", "speed_limit": null }
    ]))
    .await;

    let server = TestServer::start(&panel_config(&panel)).await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["users"], 2);
    assert_eq!(body["consecutive_failures"], 0);
    assert!(body["last_error"].is_null());
    assert!(body["last_sync"].is_string());
}

#[tokio::test]
async fn unhealthy_without_user_list() {
    let panel = MockPanel::start(json!([])).await;
    panel.fail_with(StatusCode::BAD_GATEWAY);

    let server = TestServer::start(&panel_config(&panel)).await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 503);

    let body: serde_json::Value = response.json().await.unwrap();

    insta::assert_json_snapshot!(body, @r#"
    {
      "status": "unhealthy",
      "users": 0,
      "last_sync": null,
      "consecutive_failures": 1,
      "last_error": "Panel responded with status 502 Bad Gateway"
    }
    "#);
}

#[tokio::test]
async fn failures_are_counted_while_staying_healthy() {
    let panel = MockPanel::start(json!([{ "id": 1, "uuid": "a-a", "speed_limit": null }])).await;
    let server = TestServer::start(&panel_config(&panel)).await;

    panel.fail_with(StatusCode::SERVICE_UNAVAILABLE);

    let target = panel.request_count() + 3;
    eventually(|| panel.request_count() >= target).await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["users"], 1);
    assert!(body["consecutive_failures"].as_u64().unwrap() >= 2);
    assert_eq!(body["last_error"], "Panel responded with status 503 Service Unavailable");
}
