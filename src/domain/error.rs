//! Error types for schema loading and form interaction

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised at the schema fetch boundary
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Transport failure or non-success HTTP status
    #[error("Failed to fetch form schema: {0}")]
    FetchFailure(String),

    /// Body is not `{ data: { fields: [[...]] } }` or breaks identifier rules
    #[error("Schema shape mismatch: {0}")]
    ShapeMismatch(String),
}

impl SchemaError {
    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FetchFailure(_) => "fetch_failure",
            Self::ShapeMismatch(_) => "shape_mismatch",
        }
    }
}

impl From<reqwest::Error> for SchemaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SchemaError::ShapeMismatch(err.to_string())
        } else if let Some(status) = err.status() {
            SchemaError::FetchFailure(format!("HTTP {}", status))
        } else {
            SchemaError::FetchFailure(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::ShapeMismatch(err.to_string())
    }
}

/// Errors raised while updating, submitting, or rendering the form
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Only raised when required fields are enforced
    #[error("Required fields are blank: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Submission sink failed: {0}")]
    Sink(String),

    #[error("Render error: {0}")]
    Render(#[from] tera::Error),
}

impl FormError {
    /// Convert to HTTP status code for API responses
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownField(_) => StatusCode::NOT_FOUND,
            Self::InvalidValue { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MissingRequired(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sink(_) => StatusCode::BAD_GATEWAY,
            Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
