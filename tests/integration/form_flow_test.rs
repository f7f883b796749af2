use super::common;

use common::test_server::{SchemaServer, TestServer};
use dynaform::adapters::form_renderer::FormRenderer;
use dynaform::adapters::metrics_handler::MetricsCollector;
use dynaform::config::Settings;
use dynaform::form::WeekdaySet;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_scenario_select_and_submit() {
    let server = TestServer::new("/scenario").await;
    let client = reqwest::Client::new();

    let html = client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("<label for=\"a\">Agree</label>"));
    assert!(html.contains("<option value=\"\">-- Select --</option>"));

    let response = client
        .put(server.url("/api/values/b"))
        .json(&json!("y"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = client
        .post(server.url("/api/submit"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], json!({"a": false, "b": "y"}));

    // The selection is reflected when the page is rendered again
    let html = client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("<option value=\"y\" selected>y</option>"));
}

#[tokio::test]
async fn test_html_post_submission() {
    let server = TestServer::new("/scenario").await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/"))
        .form(&[("a", "on"), ("b", "x")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Form submitted!"));

    assert_eq!(
        server.renderer.values().await.to_json(),
        json!({"a": true, "b": "x"})
    );
}

#[tokio::test]
async fn test_enforced_required_rerenders_form() {
    let server = TestServer::with_settings("/weekdays", |settings| {
        settings.form.enforce_required = true;
    })
    .await;
    let client = reqwest::Client::new();

    // Nothing is required in this schema, so enforcement lets it through
    let response = client
        .post(server.url("/"))
        .form(&[("day", "Monday")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // An option outside the weekday set is rejected and the form shown again
    let response = client
        .post(server.url("/"))
        .form(&[("day", "Caturday")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
    let html = response.text().await.unwrap();
    assert!(html.contains("class=\"form-errors\""));
    assert!(html.contains("<form method=\"post\""));
}

#[tokio::test]
async fn test_workweek_and_fallback_rendering() {
    let server = TestServer::with_settings("/weekdays", |settings| {
        settings.form.weekdays = WeekdaySet::Workweek;
    })
    .await;
    let client = reqwest::Client::new();

    let html = client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(html.contains("<option value=\"\">-- Select Day --</option>"));
    assert!(html.contains("<option value=\"Friday\">Friday</option>"));
    assert!(!html.contains("Saturday"));
    assert!(html.contains("<input type=\"time\" id=\"when\" name=\"when\""));
    assert!(html.contains("<input type=\"text\" id=\"sig\" name=\"sig\""));
}

#[tokio::test]
async fn test_reload_switches_schema_and_failure_empties_form() {
    let server = TestServer::new("/scenario").await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/api/reload"))
        .json(&json!({"api_url": server.schema.url("/weekdays")}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["fields"], 3);

    let response = client
        .post(server.url("/api/reload"))
        .json(&json!({"api_url": server.schema.url("/garbage")}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("shape mismatch"));

    let fields: serde_json::Value = client
        .get(server.url("/api/fields"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fields["data"], json!([]));

    let html = client
        .get(server.url("/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!html.contains("class=\"form-field\""));
}

#[tokio::test]
async fn test_render_once_prints_loaded_or_empty_form() {
    let schema = SchemaServer::new().await;
    let mut settings = Settings::default();
    settings.schema.api_url = schema.url("/scenario");

    let metrics = Arc::new(MetricsCollector::new().unwrap());
    let renderer = FormRenderer::from_settings(&settings, metrics).unwrap();

    let html = renderer.render_once(&schema.url("/scenario")).await.unwrap();
    assert!(html.contains("<label for=\"a\">Agree</label>"));
    assert!(html.contains("<option value=\"x\">x</option>"));

    // An unreachable schema still yields a page, just without controls
    let html = renderer.render_once(&schema.url("/broken")).await.unwrap();
    assert!(html.contains("<form method=\"post\""));
    assert!(!html.contains("class=\"form-field\""));
}
