use prometheus::{CounterVec, Encoder, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsCollector {
    registry: Registry,

    // Schema metrics
    pub schema_fetches: CounterVec,
    pub fields_loaded: IntGauge,

    // Interaction metrics
    pub value_updates: CounterVec,
    pub submissions: CounterVec,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let schema_fetches = CounterVec::new(
            Opts::new("dynaform_schema_fetches_total", "Schema fetches by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(schema_fetches.clone()))?;

        let fields_loaded = IntGauge::new(
            "dynaform_fields_loaded",
            "Number of fields in the currently rendered form",
        )?;
        registry.register(Box::new(fields_loaded.clone()))?;

        let value_updates = CounterVec::new(
            Opts::new("dynaform_value_updates_total", "Accepted field value updates"),
            &["field_type"],
        )?;
        registry.register(Box::new(value_updates.clone()))?;

        let submissions = CounterVec::new(
            Opts::new("dynaform_submissions_total", "Form submissions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        Ok(Self {
            registry,
            schema_fetches,
            fields_loaded,
            value_updates,
            submissions,
        })
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub struct MetricsHandler {
    collector: Arc<MetricsCollector>,
}

impl MetricsHandler {
    pub fn new(collector: Arc<MetricsCollector>) -> Self {
        Self { collector }
    }

    pub async fn metrics(&self) -> String {
        self.collector.encode().unwrap_or_else(|e| {
            tracing::error!("Failed to encode metrics: {}", e);
            String::from("# Error encoding metrics\n")
        })
    }
}
