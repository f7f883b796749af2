//! Form lifecycle: schema loading, value updates, submission, rendering
//!
//! `FormRenderer` owns the flattened field list and the value store. Every
//! schema load takes a generation ticket; only the load holding the newest
//! ticket may replace the state, so a slow response to an older request can
//! never overwrite a newer form.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::adapters::metrics_handler::MetricsCollector;
use crate::adapters::schema_fetcher::HttpSchemaSource;
use crate::adapters::submission_sink;
use crate::config::Settings;
use crate::domain::{
    FieldDescriptor, FieldValue, FormError, SchemaError, SchemaPort, SubmissionPort, ValueStore,
};
use crate::form::{FieldRegistry, HtmlRenderer, ValueShape};

/// Result of a schema load that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The form now shows `fields` fields
    Loaded { fields: usize },
    /// A newer load started before this one finished; its result was dropped
    Superseded,
}

/// Consistent view of the form at one instant.
#[derive(Debug, Clone, Default)]
pub struct FormSnapshot {
    pub api_url: String,
    pub fields: Arc<Vec<FieldDescriptor>>,
    pub values: ValueStore,
    pub loaded: bool,
}

pub struct FormRenderer {
    source: Arc<dyn SchemaPort>,
    sink: Arc<dyn SubmissionPort>,
    registry: FieldRegistry,
    html: HtmlRenderer,
    title: String,
    enforce_required: bool,
    state: RwLock<FormSnapshot>,
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
    metrics: Arc<MetricsCollector>,
}

impl FormRenderer {
    pub fn new(
        source: Arc<dyn SchemaPort>,
        sink: Arc<dyn SubmissionPort>,
        registry: FieldRegistry,
        api_url: impl Into<String>,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self, FormError> {
        Ok(Self {
            source,
            sink,
            registry,
            html: HtmlRenderer::new()?,
            title: "Dynamic Form Generator".to_string(),
            enforce_required: false,
            state: RwLock::new(FormSnapshot {
                api_url: api_url.into(),
                ..Default::default()
            }),
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
            metrics,
        })
    }

    /// Renderer wired to the HTTP schema source and the configured sink.
    pub fn from_settings(settings: &Settings, metrics: Arc<MetricsCollector>) -> anyhow::Result<Self> {
        let renderer = Self::new(
            Arc::new(HttpSchemaSource::from_settings(&settings.schema)?),
            submission_sink::from_settings(&settings.submission)?,
            settings.form.registry(),
            settings.schema.api_url.clone(),
            metrics,
        )?
        .with_title(settings.form.title.clone())
        .with_required_enforcement(settings.form.enforce_required);
        Ok(renderer)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_required_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_required = enforce;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Fetch `url` and, unless a newer load started meanwhile, replace the
    /// field list and reseed the store.
    ///
    /// A failed fetch leaves the form empty and is returned as the error.
    pub async fn load(&self, url: &str) -> Result<LoadOutcome, SchemaError> {
        let ticket = self.next_ticket();
        self.complete_load(ticket, url).await
    }

    async fn complete_load(&self, ticket: u64, url: &str) -> Result<LoadOutcome, SchemaError> {
        let result = self.source.fetch_fields(url).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, url, "Discarding superseded schema response");
            self.metrics
                .schema_fetches
                .with_label_values(&["superseded"])
                .inc();
            return Ok(LoadOutcome::Superseded);
        }

        state.api_url = url.to_string();
        match result {
            Ok(fields) => {
                let count = fields.len();
                state.values = self.registry.seed(&fields);
                state.fields = Arc::new(fields);
                state.loaded = true;

                self.metrics.schema_fetches.with_label_values(&["success"]).inc();
                self.metrics.fields_loaded.set(count as i64);
                info!(url, fields = count, "Form schema loaded");
                Ok(LoadOutcome::Loaded { fields: count })
            }
            Err(e) => {
                state.fields = Arc::new(Vec::new());
                state.values = ValueStore::new();
                state.loaded = false;

                self.metrics.schema_fetches.with_label_values(&[e.kind()]).inc();
                self.metrics.fields_loaded.set(0);
                error!(url, error = %e, "Error fetching form fields");
                Err(e)
            }
        }
    }

    /// Start a background load of `url`, aborting the load in flight.
    ///
    /// The ticket is taken before this returns, so any earlier load (aborted
    /// or not) is already stale. Ticket, spawn and handle swap happen under
    /// the `in_flight` lock: a reload only ever aborts an older one.
    pub fn reload(self: &Arc<Self>, url: impl Into<String>) -> JoinHandle<Result<LoadOutcome, SchemaError>> {
        let url = url.into();
        let mut slot = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let ticket = self.next_ticket();
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.complete_load(ticket, &url).await });

        if let Some(previous) = slot.replace(handle.abort_handle()) {
            previous.abort();
        }
        handle
    }

    /// Load `url` once and render the page, empty if the fetch failed.
    pub async fn render_once(&self, url: &str) -> Result<String, FormError> {
        if let Err(e) = self.load(url).await {
            warn!(url, error = %e, "Rendering an empty form");
        }
        self.render_page(&[]).await
    }

    /// Reload from `url` (or the current URL) and wait for the outcome.
    pub async fn refresh(self: &Arc<Self>, url: Option<String>) -> Result<LoadOutcome, SchemaError> {
        let url = match url {
            Some(url) => url,
            None => self.state.read().await.api_url.clone(),
        };

        match self.reload(url).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Ok(LoadOutcome::Superseded),
            Err(e) => Err(SchemaError::FetchFailure(format!("reload task failed: {}", e))),
        }
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        self.state.read().await.clone()
    }

    pub async fn fields(&self) -> Arc<Vec<FieldDescriptor>> {
        Arc::clone(&self.state.read().await.fields)
    }

    pub async fn values(&self) -> ValueStore {
        self.state.read().await.values.clone()
    }

    pub async fn api_url(&self) -> String {
        self.state.read().await.api_url.clone()
    }

    /// True once a schema load has succeeded and no later load failed.
    pub async fn is_ready(&self) -> bool {
        self.state.read().await.loaded
    }

    /// Replace the value of `field_id`, keeping every other entry.
    pub async fn update(&self, field_id: &str, value: FieldValue) -> Result<ValueStore, FormError> {
        let mut state = self.state.write().await;
        let field = find_field(&state.fields, field_id)?;

        if let Err(e) = self.registry.check_value(field, &value) {
            warn!(field_id, error = %e, "Rejected value update");
            return Err(e);
        }

        let kind = self.registry.resolve(&field.field_type).as_str().to_string();
        state.values = state.values.with(field_id, value);
        self.metrics.value_updates.with_label_values(&[kind.as_str()]).inc();
        Ok(state.values.clone())
    }

    /// Add or remove one option of a multi-select field.
    ///
    /// Computed from the stored selection under the write lock.
    pub async fn toggle(&self, field_id: &str, option: &str, selected: bool) -> Result<ValueStore, FormError> {
        let mut state = self.state.write().await;
        let field = find_field(&state.fields, field_id)?;

        if self.registry.rule(&field.field_type).shape != ValueShape::Many {
            warn!(field_id, "Rejected toggle on a single-valued field");
            return Err(FormError::invalid(field_id, "only multi-select fields can be toggled"));
        }

        let toggled = state.values.toggled(field_id, option, selected);
        if let Some(value) = toggled.get(field_id) {
            if let Err(e) = self.registry.check_value(field, value) {
                warn!(field_id, option, error = %e, "Rejected toggle");
                return Err(e);
            }
        }

        let kind = self.registry.resolve(&field.field_type).as_str().to_string();
        state.values = toggled;
        self.metrics.value_updates.with_label_values(&[kind.as_str()]).inc();
        Ok(state.values.clone())
    }

    /// Submission from the HTML form: the posted name/value pairs become the
    /// whole store, which is then handed to the sink.
    pub async fn submit_form(&self, pairs: Vec<(String, String)>) -> Result<ValueStore, FormError> {
        let (fields, values) = {
            let mut state = self.state.write().await;
            let fields = Arc::clone(&state.fields);

            let mut values = ValueStore::new();
            for field in fields.iter() {
                let posted: Vec<&str> = pairs
                    .iter()
                    .filter(|(name, _)| name == field.key())
                    .map(|(_, value)| value.as_str())
                    .collect();
                let value = self.registry.value_from_form(field, &posted);
                if let Err(e) = self.registry.check_value(field, &value) {
                    self.metrics.submissions.with_label_values(&["rejected"]).inc();
                    return Err(e);
                }
                values = values.with(field.key(), value);
            }

            state.values = values.clone();
            (fields, values)
        };

        self.deliver(&fields, values).await
    }

    /// Submission of the store as it currently stands.
    pub async fn submit_current(&self) -> Result<ValueStore, FormError> {
        let snapshot = self.snapshot().await;
        self.deliver(&snapshot.fields, snapshot.values).await
    }

    async fn deliver(&self, fields: &[FieldDescriptor], values: ValueStore) -> Result<ValueStore, FormError> {
        if self.enforce_required {
            let missing = missing_required(fields, &values);
            if !missing.is_empty() {
                self.metrics.submissions.with_label_values(&["rejected"]).inc();
                return Err(FormError::MissingRequired(missing));
            }
        }

        match self.sink.deliver(&values).await {
            Ok(()) => {
                self.metrics.submissions.with_label_values(&["delivered"]).inc();
                Ok(values)
            }
            Err(e) => {
                error!(error = %e, "Submission sink failed");
                self.metrics.submissions.with_label_values(&["sink_error"]).inc();
                Err(FormError::Sink(e.to_string()))
            }
        }
    }

    /// The form page for the current state, with `errors` listed above it.
    pub async fn render_page(&self, errors: &[String]) -> Result<String, FormError> {
        let snapshot = self.snapshot().await;
        Ok(self.html.render_form(
            &self.title,
            &self.registry,
            &snapshot.fields,
            &snapshot.values,
            errors,
        )?)
    }

    pub fn render_submitted(&self, values: &ValueStore) -> Result<String, FormError> {
        Ok(self.html.render_submitted(&self.title, values)?)
    }
}

fn find_field<'a>(fields: &'a [FieldDescriptor], field_id: &str) -> Result<&'a FieldDescriptor, FormError> {
    fields
        .iter()
        .find(|f| f.key() == field_id)
        .ok_or_else(|| FormError::UnknownField(field_id.to_string()))
}

/// Labels of required fields whose value is blank.
fn missing_required(fields: &[FieldDescriptor], values: &ValueStore) -> Vec<String> {
    fields
        .iter()
        .filter(|f| f.properties.required)
        .filter(|f| values.get(f.key()).map_or(true, FieldValue::is_blank))
        .map(|f| f.label().to_string())
        .collect()
}
