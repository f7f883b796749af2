use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapters::form_renderer::FormRenderer;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub schema: String,
    pub fields: usize,
}

pub struct HealthHandler {
    renderer: Arc<FormRenderer>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(renderer: Arc<FormRenderer>) -> Self {
        Self {
            renderer,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let snapshot = self.renderer.snapshot().await;
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            checks: HealthChecks {
                schema: (if snapshot.loaded { "loaded" } else { "empty" }).to_string(),
                fields: snapshot.fields.len(),
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - 200 once a form schema has been loaded
    pub async fn ready(&self) -> impl IntoResponse {
        if self.renderer.is_ready().await {
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ready",
                    "message": "Form schema loaded"
                })),
            )
        } else {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "message": "Form schema not loaded"
                })),
            )
        }
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "alive",
                "message": "Server is alive"
            })),
        )
    }
}
