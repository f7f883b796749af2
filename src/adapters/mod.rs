pub mod form_handler;
pub mod form_renderer;
pub mod health_handler;
pub mod metrics_handler;
pub mod schema_fetcher;
pub mod submission_sink;
