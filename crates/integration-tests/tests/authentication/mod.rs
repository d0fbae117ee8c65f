use http::StatusCode;
use integration_tests::{MockPanel, TestServer, eventually, panel_config};
use serde_json::json;

/// Waits until the panel has served two more requests, so at least one full sync cycle ran since the call.
async fn next_sync(panel: &MockPanel) {
    let target = panel.request_count() + 2;
    eventually(|| panel.request_count() >= target).await;
}

#[tokio::test]
async fn known_user_is_accepted() {
    let panel = MockPanel::start(json!([{ "id": 1, "uuid": "a-a", "speed_limit": null }])).await;
    let server = TestServer::start(&panel_config(&panel)).await;

    insta::assert_json_snapshot!(server.client.authenticate("a-a").await, @r#"
    {
      "ok": true,
      "id": "1"
    }
    "#);

    insta::assert_json_snapshot!(server.client.authenticate("b-b").await, @r#"
    {
      "ok": false,
      "id": ""
    }
    "#);
}

#[tokio::test]
async fn first_fetch_happens_before_listening() {
    let panel = MockPanel::start(json!([{ "id": 7, "uuid": "first", "speed_limit": 100 }])).await;
    let server = TestServer::start(&panel_config(&panel)).await;

    // No waiting: the snapshot is installed before the listener accepts connections.
    assert_eq!(server.client.authenticate("first").await["id"], "7");
    assert!(panel.request_count() >= 1);
}

#[tokio::test]
async fn new_users_are_picked_up_on_refresh() {
    let panel = MockPanel::start(json!([{ "id": 1, "uuid": "a-a", "speed_limit": null }])).await;
    let server = TestServer::start(&panel_config(&panel)).await;

    assert_eq!(server.client.authenticate("b-b").await["ok"], false);

    panel.set_users(json!([
        { "id": 1, "uuid": "a-a", "speed_limit": null },
        { "id": 2, "uuid": "b-b", "speed_limit": 50 }
    ]));
    next_sync(&panel).await;

    assert_eq!(server.client.authenticate("a-a").await["id"], "1");
    assert_eq!(server.client.authenticate("b-b").await["id"], "2");
}

#[tokio::test]
async fn failed_refresh_keeps_previous_users() {
    let panel = MockPanel::start(json!([{ "id": 1, "uuid": "a-a", "speed_limit": null }])).await;
    let server = TestServer::start(&panel_config(&panel)).await;

    panel.fail_with(StatusCode::INTERNAL_SERVER_ERROR);
    next_sync(&panel).await;

    assert_eq!(server.client.authenticate("a-a").await["ok"], true);

    panel.set_raw_body("<html>maintenance</html>");
    next_sync(&panel).await;

    assert_eq!(server.client.authenticate("a-a").await["ok"], true);
}

#[tokio::test]
async fn failed_first_fetch_denies_everyone() {
    let panel = MockPanel::start(json!([{ "id": 1, "uuid": "a-a", "speed_limit": null }])).await;
    panel.fail_with(StatusCode::FORBIDDEN);

    let server = TestServer::start(&panel_config(&panel)).await;

    assert_eq!(server.client.authenticate("a-a").await["ok"], false);

    // Synchronization is disabled after a failed start, the panel recovering changes nothing.
    panel.set_users(json!([{ "id": 1, "uuid": "a-a", "speed_limit": null }]));
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    assert_eq!(panel.request_count(), 1);
    assert_eq!(server.client.authenticate("a-a").await["ok"], false);
}

#[tokio::test]
async fn malformed_request_is_rejected() {
    let panel = MockPanel::start(json!([])).await;
    let server = TestServer::start(&panel_config(&panel)).await;

    let response = server.client.post("/auth", &json!({ "auth": "a-a" })).await.unwrap();

    assert_eq!(response.status(), 422);
}
