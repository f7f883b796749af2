use thiserror::Error;

use crate::config::{FormSettings, SchemaSettings, ServerSettings, Settings, SinkKind, SubmissionSettings};
use crate::domain::FieldKind;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Collects every problem instead of stopping at the first one.
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        Self::validate_server(&settings.server, &mut errors);
        Self::validate_schema(&settings.schema, &mut errors);
        Self::validate_form(&settings.form, &mut errors);
        Self::validate_submission(&settings.submission, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings, errors: &mut Vec<ValidationError>) {
        if server.host.is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }
    }

    fn validate_schema(schema: &SchemaSettings, errors: &mut Vec<ValidationError>) {
        if schema.api_url.is_empty() {
            errors.push(ValidationError::MissingField("schema.api_url".to_string()));
        } else if !is_http_url(&schema.api_url) {
            errors.push(ValidationError::InvalidValue {
                field: "schema.api_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", schema.api_url),
            });
        }

        if schema.timeout_seconds == Some(0) {
            errors.push(ValidationError::InvalidValue {
                field: "schema.timeout_seconds".to_string(),
                reason: "Timeout must be greater than 0 (omit it to disable)".to_string(),
            });
        }
    }

    fn validate_form(form: &FormSettings, errors: &mut Vec<ValidationError>) {
        for (tag, kind) in &form.aliases {
            if !FieldKind::from(kind.as_str()).is_known() {
                errors.push(ValidationError::InvalidValue {
                    field: format!("form.aliases.{}", tag),
                    reason: format!("'{}' is not a known field type", kind),
                });
            }
        }
    }

    fn validate_submission(submission: &SubmissionSettings, errors: &mut Vec<ValidationError>) {
        if submission.sink != SinkKind::Http {
            return;
        }

        match submission.url.as_deref() {
            None | Some("") => {
                errors.push(ValidationError::MissingField("submission.url".to_string()))
            }
            Some(url) if !is_http_url(url) => errors.push(ValidationError::InvalidValue {
                field: "submission.url".to_string(),
                reason: format!("'{}' is not an http(s) URL", url),
            }),
            Some(_) => {}
        }
    }
}

/// Only http and https schemes are fetched.
pub fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
