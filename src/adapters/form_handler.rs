//! HTTP handlers for the rendered form and its JSON API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::adapters::form_renderer::{FormRenderer, LoadOutcome};
use crate::config::validator::is_http_url;
use crate::domain::{FieldDescriptor, FieldValue, FormError, ValueStore};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ApiResponse::<()>::error(self.to_string())),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub option: String,
    pub selected: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReloadRequest {
    #[serde(default)]
    pub api_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResult {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<usize>,
}

impl From<LoadOutcome> for ReloadResult {
    fn from(outcome: LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::Loaded { fields } => Self {
                outcome: "loaded",
                fields: Some(fields),
            },
            LoadOutcome::Superseded => Self {
                outcome: "superseded",
                fields: None,
            },
        }
    }
}

// ============================================================================
// HTML Endpoints
// ============================================================================

/// GET / - The rendered form
pub async fn show_form(State(renderer): State<Arc<FormRenderer>>) -> Response {
    match renderer.render_page(&[]).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => render_failure(e),
    }
}

/// POST / - HTML form submission
pub async fn submit_form(
    State(renderer): State<Arc<FormRenderer>>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    match renderer.submit_form(pairs).await {
        Ok(values) => match renderer.render_submitted(&values) {
            Ok(page) => Html(page).into_response(),
            Err(e) => render_failure(e),
        },
        Err(e) => {
            warn!(error = %e, "Form submission rejected");
            let status = e.status_code();
            let messages = match &e {
                FormError::MissingRequired(labels) => labels
                    .iter()
                    .map(|label| format!("{} is required", label))
                    .collect(),
                other => vec![other.to_string()],
            };
            match renderer.render_page(&messages).await {
                Ok(page) => (status, Html(page)).into_response(),
                Err(e) => render_failure(e),
            }
        }
    }
}

fn render_failure(e: FormError) -> Response {
    error!(error = %e, "Failed to render form page");
    (e.status_code(), e.to_string()).into_response()
}

// ============================================================================
// JSON API Endpoints
// ============================================================================

/// GET /api/fields - Flattened field descriptors
pub async fn list_fields(State(renderer): State<Arc<FormRenderer>>) -> impl IntoResponse {
    let fields: Vec<FieldDescriptor> = renderer.fields().await.to_vec();
    (StatusCode::OK, Json(ApiResponse::success(fields)))
}

/// GET /api/values - Current value store
pub async fn get_values(State(renderer): State<Arc<FormRenderer>>) -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::success(renderer.values().await)))
}

/// PUT /api/values/:field_id - Replace one field's value
pub async fn update_value(
    State(renderer): State<Arc<FormRenderer>>,
    Path(field_id): Path<String>,
    Json(value): Json<FieldValue>,
) -> Result<Json<ApiResponse<ValueStore>>, FormError> {
    let values = renderer.update(&field_id, value).await?;
    Ok(Json(ApiResponse::success(values)))
}

/// POST /api/values/:field_id/toggle - Add or remove one multi-select option
pub async fn toggle_value(
    State(renderer): State<Arc<FormRenderer>>,
    Path(field_id): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ApiResponse<ValueStore>>, FormError> {
    let values = renderer
        .toggle(&field_id, &request.option, request.selected)
        .await?;
    Ok(Json(ApiResponse::success(values)))
}

/// POST /api/submit - Submit the current store
pub async fn submit_values(
    State(renderer): State<Arc<FormRenderer>>,
) -> Result<Json<ApiResponse<ValueStore>>, FormError> {
    let values = renderer.submit_current().await?;
    Ok(Json(ApiResponse::success(values)))
}

/// POST /api/reload - Re-fetch the schema, optionally from a new URL
pub async fn reload_schema(
    State(renderer): State<Arc<FormRenderer>>,
    request: Option<Json<ReloadRequest>>,
) -> impl IntoResponse {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    if let Some(url) = request.api_url.as_deref().filter(|url| !is_http_url(url)) {
        warn!("Rejected reload from non-http URL {}", url);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<ReloadResult>::error(format!(
                "'{}' is not an http(s) URL",
                url
            ))),
        );
    }

    match renderer.refresh(request.api_url).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(ReloadResult::from(outcome))),
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<ReloadResult>::error(e.to_string())),
        ),
    }
}
