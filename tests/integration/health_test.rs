use super::common;

use common::mock_agents::{route, MockAgentService};
use common::test_server::TestServer;

#[tokio::test]
async fn test_health_endpoint() {
    let service = MockAgentService::start().await;
    let server = TestServer::new(service.settings(vec![])).await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/api/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "agent-gateway");
    assert!(body["uptime_seconds"].is_number());
    assert!(body["version"].is_string());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_ready_endpoint() {
    let service = MockAgentService::start().await;
    let client = reqwest::Client::new();

    let empty = TestServer::new(service.settings(vec![])).await;
    let response = client.get(empty.url("/api/health/ready")).send().await.unwrap();
    assert_eq!(response.status(), 503);

    let configured =
        TestServer::new(service.settings(vec![route("viz-pick", "asst_viz", None)])).await;
    let response = client
        .get(configured.url("/api/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["agents"][0], "viz-pick");
    // Readiness never touches the agent service
    assert!(service.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_health_live_endpoint() {
    let service = MockAgentService::start().await;
    let server = TestServer::new(service.settings(vec![])).await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/api/health/live"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let service = MockAgentService::start().await;
    let server = TestServer::new(service.settings(vec![])).await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(body.contains("gateway_agent_connections_total 0"));
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let service = MockAgentService::start().await;
    let server = TestServer::new(service.settings(vec![])).await;

    let response = reqwest::get(server.url("/api/health")).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}
