//! HTTP surface E2E tests.
//!
//! Spin up the real server via `TestServer` against a wiremock gateway and
//! drive it with reqwest, the way the camera management panel would.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use streamgate_test_utils::TestServer;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_live_probe(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v3/config/global/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health_reports_gateway_online() -> Result<(), anyhow::Error> {
    let gateway = MockServer::start().await;
    mount_live_probe(&gateway).await;

    let server = TestServer::spawn(&gateway.uri()).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["gateway"], "online");

    Ok(())
}

#[tokio::test]
async fn test_health_reports_gateway_offline() -> Result<(), anyhow::Error> {
    // Bind then drop a listener so the port refuses connections.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let dead = format!("http://{}", listener.local_addr()?);
    drop(listener);

    let server = TestServer::spawn(&dead).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/health", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["gateway"], "offline");

    Ok(())
}

#[tokio::test]
async fn test_gateway_endpoint_distinguishes_disabled() -> Result<(), anyhow::Error> {
    let gateway = MockServer::start().await;
    let overrides = HashMap::from([("GATEWAY_API_ENABLED".to_string(), "false".to_string())]);
    let server = TestServer::spawn_with_vars(&gateway.uri(), overrides).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/gateway", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["enabled"], false);
    assert_eq!(body["reachable"], false);
    assert_eq!(body["api_url"], gateway.uri());

    Ok(())
}

#[tokio::test]
async fn test_register_and_status_round_trip() -> Result<(), anyhow::Error> {
    let gateway = MockServer::start().await;
    mount_live_probe(&gateway).await;

    Mock::given(method("POST"))
        .and(path("/v3/config/paths/add/k1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&gateway)
        .await;

    Mock::given(method("GET"))
        .and(path("/v3/paths/get/k1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "k1"})))
        .mount(&gateway)
        .await;

    let server = TestServer::spawn(&gateway.uri()).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/v1/streams/k1", server.url()))
        .json(&serde_json::json!({"source": "rtsp://admin:pw@cam/1"}))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["reason"], "registered");
    assert_eq!(body["playback_url"], "http://localhost:8888/k1/index.m3u8");

    let response = client
        .get(format!("{}/v1/streams/k1", server.url()))
        .send()
        .await?;
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["path_state"], "active");
    assert_eq!(body["gateway_reachable"], true);

    Ok(())
}

/// A gateway rejection comes back as 200 with the advisory failure in the
/// body; the caller's camera record flow is never interrupted by it.
#[tokio::test]
async fn test_rejected_registration_is_advisory() -> Result<(), anyhow::Error> {
    let gateway = MockServer::start().await;
    mount_live_probe(&gateway).await;

    Mock::given(method("POST"))
        .and(path("/v3/config/paths/add/k1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("exploded"))
        .mount(&gateway)
        .await;

    let server = TestServer::spawn(&gateway.uri()).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/v1/streams/k1", server.url()))
        .json(&serde_json::json!({"source": "rtsp://cam/1"}))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["reason"], "gateway_rejected");
    assert_eq!(body["http_status"], 500);

    Ok(())
}

#[tokio::test]
async fn test_delete_is_idempotent_over_http() -> Result<(), anyhow::Error> {
    let gateway = MockServer::start().await;
    mount_live_probe(&gateway).await;

    Mock::given(method("POST"))
        .and(path("/v3/config/paths/remove/k1"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .mount(&gateway)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/config/paths/remove/k1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&gateway)
        .await;

    let server = TestServer::spawn(&gateway.uri()).await?;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let response = client
            .delete(format!("{}/v1/streams/k1", server.url()))
            .send()
            .await?;
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["success"], true);
        assert_eq!(body["reason"], "unregistered");
    }

    Ok(())
}

#[tokio::test]
async fn test_update_endpoint_reports_sub_step_failure() -> Result<(), anyhow::Error> {
    let gateway = MockServer::start().await;
    mount_live_probe(&gateway).await;

    Mock::given(method("POST"))
        .and(path("/v3/config/paths/remove/k1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("stuck"))
        .mount(&gateway)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/config/paths/add/k1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&gateway)
        .await;

    let server = TestServer::spawn(&gateway.uri()).await?;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/v1/streams/k1", server.url()))
        .json(&serde_json::json!({"source": "rtsp://cam/2"}))
        .send()
        .await?;

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["reason"], "registered");
    assert_eq!(body["unregister_failure"]["reason"], "gateway_rejected");
    assert_eq!(body["unregister_failure"]["http_status"], 500);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let gateway = MockServer::start().await;
    let server = TestServer::spawn(&gateway.uri()).await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/v1/nonexistent", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), 404);

    Ok(())
}

#[tokio::test]
async fn test_register_without_body_is_rejected() -> Result<(), anyhow::Error> {
    let gateway = MockServer::start().await;
    let server = TestServer::spawn(&gateway.uri()).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/v1/streams/k1", server.url()))
        .send()
        .await?;

    // Missing JSON body is a client error, not an advisory result.
    assert!(response.status().is_client_error());

    Ok(())
}
