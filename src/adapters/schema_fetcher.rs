//! HTTP adapter for the template API
//!
//! One GET per fetch: no auth headers, no retries.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::SchemaSettings;
use crate::domain::schema::SchemaEnvelope;
use crate::domain::{FieldDescriptor, SchemaError, SchemaPort};

#[derive(Debug, Clone, Default)]
pub struct HttpSchemaSource {
    client: Client,
}

impl HttpSchemaSource {
    pub fn new(timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_settings(settings: &SchemaSettings) -> reqwest::Result<Self> {
        Self::new(settings.timeout_seconds.map(Duration::from_secs))
    }
}

#[async_trait]
impl SchemaPort for HttpSchemaSource {
    async fn fetch_fields(&self, url: &str) -> Result<Vec<FieldDescriptor>, SchemaError> {
        debug!("Fetching form schema from {}", url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;

        SchemaEnvelope::parse(&body)?.into_fields()
    }
}
