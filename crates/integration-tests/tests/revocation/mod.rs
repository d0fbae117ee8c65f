use integration_tests::{KickRequest, MockPanel, MockTrafficApi, TestServer, eventually, kick_config};
use serde_json::json;

#[tokio::test]
async fn removed_user_is_kicked_and_denied() {
    let panel = MockPanel::start(json!([{ "id": 1, "uuid": "a-a", "speed_limit": null }])).await;
    let traffic = MockTrafficApi::start().await;
    let server = TestServer::start(&kick_config(&panel, &traffic, "s3cret")).await;

    assert_eq!(server.client.authenticate("a-a").await["ok"], true);

    panel.set_users(json!([]));
    eventually(|| !traffic.kicks().is_empty()).await;

    assert_eq!(
        traffic.kicks(),
        vec![KickRequest {
            authorization: Some("s3cret".to_string()),
            ids: vec!["1".to_string()],
        }]
    );

    assert_eq!(server.client.authenticate("a-a").await["ok"], false);
}

#[tokio::test]
async fn every_removed_user_is_kicked_once() {
    let panel = MockPanel::start(json!([
        { "id": 3, "uuid": "c-c", "speed_limit": null },
        { "id": 1, "uuid": "a-a", "speed_limit": null },
        { "id": 2, "uuid": "b-b", "speed_limit": null }
    ]))
    .await;

    let traffic = MockTrafficApi::start().await;
    let _server = TestServer::start(&kick_config(&panel, &traffic, "s3cret")).await;

    panel.set_users(json!([{ "id": 2, "uuid": "b-b", "speed_limit": null }]));
    eventually(|| traffic.kicked_ids().len() >= 2).await;

    // Give a few more sync cycles the chance to kick again.
    let target = panel.request_count() + 3;
    eventually(|| panel.request_count() >= target).await;

    assert_eq!(traffic.kicked_ids(), vec!["1", "3"]);
}

#[tokio::test]
async fn changed_speed_limit_is_not_a_removal() {
    let panel = MockPanel::start(json!([{ "id": 1, "uuid": "a-a", "speed_limit": 100 }])).await;
    let traffic = MockTrafficApi::start().await;
    let server = TestServer::start(&kick_config(&panel, &traffic, "s3cret")).await;

    panel.set_users(json!([{ "id": 1, "uuid": "a-a", "speed_limit": 200 }]));

    let target = panel.request_count() + 3;
    eventually(|| panel.request_count() >= target).await;

    assert!(traffic.kicks().is_empty());
    assert_eq!(server.client.authenticate("a-a").await["id"], "1");
}

#[tokio::test]
async fn rotated_credential_kicks_the_old_one() {
    let panel = MockPanel::start(json!([{ "id": 5, "uuid": "old", "speed_limit": null }])).await;
    let traffic = MockTrafficApi::start().await;
    let server = TestServer::start(&kick_config(&panel, &traffic, "s3cret")).await;

    panel.set_users(json!([{ "id": 5, "uuid": "new", "speed_limit": null }]));
    eventually(|| !traffic.kicks().is_empty()).await;

    assert_eq!(traffic.kicked_ids(), vec!["5"]);
    assert_eq!(server.client.authenticate("old").await["ok"], false);
    assert_eq!(server.client.authenticate("new").await["id"], "5");
}
