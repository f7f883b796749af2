//! # Dynaform - Dynamic Form Server
//!
//! Dynaform fetches a field-group schema from a template API and serves it as
//! an HTML form. Field values live in a server-side store that the form post
//! and a small JSON API both drive.
//!
//! ## Features
//!
//! - **Field Dispatch**: one table maps every field type to its control and default value
//! - **Cancellable Reloads**: a newer schema load always wins over an older one
//! - **Submission Sinks**: structured log event or JSON POST
//! - **Metrics**: Prometheus metrics for monitoring
//! - **Health Checks**: Kubernetes-ready health endpoints
//! - **Live Reload**: the form is re-fetched when the configured API URL changes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynaform::adapters::form_renderer::FormRenderer;
//! use dynaform::adapters::metrics_handler::MetricsCollector;
//! use dynaform::config::Settings;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let metrics = Arc::new(MetricsCollector::new()?);
//!     let renderer = FormRenderer::from_settings(&settings, metrics)?;
//!
//!     renderer.load(&settings.schema.api_url).await?;
//!     println!("{}", renderer.render_page(&[]).await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: field descriptors, values, the value store, ports and errors
//! - **Form**: the field type registry and HTML rendering
//! - **Adapters**: HTTP schema source, submission sinks, the form lifecycle and handlers
//! - **Config**: configuration loading, validation and watching

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod form;

use crate::adapters::form_handler;
use crate::adapters::form_renderer::FormRenderer;
use crate::adapters::health_handler::HealthHandler;
use crate::adapters::metrics_handler::MetricsHandler;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `renderer` - Form lifecycle shared by the HTML and JSON endpoints
/// * `health_handler` - Health check handler
/// * `metrics_handler` - Metrics collection handler
pub fn create_app(
    renderer: Arc<FormRenderer>,
    health_handler: Arc<HealthHandler>,
    metrics_handler: Arc<MetricsHandler>,
) -> Router {
    let ops_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }))
        .route("/metrics", get({
            let handler = metrics_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.metrics().await }
            }
        }));

    let api_router = Router::new()
        .route("/fields", get(form_handler::list_fields))
        .route("/values", get(form_handler::get_values))
        .route("/values/:field_id", put(form_handler::update_value))
        .route("/values/:field_id/toggle", post(form_handler::toggle_value))
        .route("/submit", post(form_handler::submit_values))
        .route("/reload", post(form_handler::reload_schema));

    let form_router = Router::new()
        .route("/", get(form_handler::show_form).post(form_handler::submit_form))
        .nest("/api", api_router)
        .with_state(renderer);

    ops_router.merge(form_router).layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
