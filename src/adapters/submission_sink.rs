//! Destinations for submitted form values

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

use crate::config::{SinkKind, SubmissionSettings};
use crate::domain::{SubmissionPort, ValueStore};

/// Emits each submission as a structured tracing event.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl SubmissionPort for LogSink {
    async fn deliver(&self, values: &ValueStore) -> anyhow::Result<()> {
        let payload = serde_json::to_string(values)?;
        info!(fields = values.len(), payload = %payload, "Form submitted");
        Ok(())
    }
}

/// POSTs each submission as a JSON object to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    url: String,
}

impl HttpSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SubmissionPort for HttpSink {
    async fn deliver(&self, values: &ValueStore) -> anyhow::Result<()> {
        let response = self.client.post(&self.url).json(values).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Submission endpoint {} returned error {}: {}",
                self.url,
                status,
                text
            ));
        }

        info!(url = %self.url, fields = values.len(), "Form submission delivered");
        Ok(())
    }
}

/// Sink selected by `[submission]`.
pub fn from_settings(settings: &SubmissionSettings) -> anyhow::Result<Arc<dyn SubmissionPort>> {
    match settings.sink {
        SinkKind::Log => Ok(Arc::new(LogSink)),
        SinkKind::Http => {
            let url = settings
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("submission.url is required for the http sink"))?;
            Ok(Arc::new(HttpSink::new(url)))
        }
    }
}
