use super::common;

use common::test_server::TestServer;

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new("/scenario").await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["uptime_seconds"].is_number());
    assert!(body["version"].is_string());
    assert_eq!(body["checks"]["schema"], "loaded");
    assert_eq!(body["checks"]["fields"], 2);
}

#[tokio::test]
async fn test_health_ready_after_load() {
    let server = TestServer::new("/scenario").await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/health/ready")).send().await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_health_not_ready_when_schema_unavailable() {
    let server = TestServer::new("/broken").await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/health/ready")).send().await.unwrap();
    assert_eq!(response.status(), 503);

    // Liveness does not depend on the schema
    let response = client.get(server.url("/health/live")).send().await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = TestServer::new("/broken").await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/metrics")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let text = response.text().await.unwrap();
    assert!(text.contains("dynaform_schema_fetches_total{outcome=\"fetch_failure\"} 1"));
    assert!(text.contains("dynaform_fields_loaded 0"));
}
