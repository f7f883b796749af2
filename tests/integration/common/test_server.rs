use axum::{http::StatusCode, routing::get, Router};
use dynaform::adapters::{
    form_renderer::FormRenderer,
    health_handler::HealthHandler,
    metrics_handler::{MetricsCollector, MetricsHandler},
};
use dynaform::config::Settings;
use std::net::SocketAddr;
use std::sync::Arc;

pub const SCENARIO_SCHEMA: &str = r#"{"data":{"fields":[
    [{"fieldId":"a","fieldType":"checkbox","fieldName":"Agree"}],
    [{"fieldId":"b","fieldType":"dropdown","fieldName":"Pick","properties":{"options":["x","y"]}}]
]}}"#;

pub const WEEKDAY_SCHEMA: &str = r#"{"data":{"fields":[
    [{"fieldUniqueKey":"day","fieldType":"weekdays","fieldName":"Day"},
     {"fieldUniqueKey":"when","fieldType":"fixed_time","fieldName":"When"},
     {"fieldUniqueKey":"sig","fieldType":"signature","fieldName":"Signature"}]
]}}"#;

/// Stand-in for the template API.
///
/// `/scenario` and `/weekdays` serve schemas, `/broken` answers 500 and
/// `/garbage` returns a body that is not a schema.
pub struct SchemaServer {
    pub base_url: String,
}

impl SchemaServer {
    pub async fn new() -> Self {
        let app = Router::new()
            .route("/scenario", get(|| async { SCENARIO_SCHEMA }))
            .route("/weekdays", get(|| async { WEEKDAY_SCHEMA }))
            .route(
                "/broken",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
            )
            .route("/garbage", get(|| async { "<html>not json</html>" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        SchemaServer {
            base_url: format!("http://{}", addr),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
    pub schema: SchemaServer,
    pub renderer: Arc<FormRenderer>,
}

impl TestServer {
    /// App server whose form is loaded from `schema_path` on the schema server.
    pub async fn new(schema_path: &str) -> Self {
        Self::with_settings(schema_path, |_| {}).await
    }

    pub async fn with_settings(schema_path: &str, customize: impl FnOnce(&mut Settings)) -> Self {
        let schema = SchemaServer::new().await;

        let mut settings = Settings::default();
        settings.server.port = 0;
        settings.schema.api_url = schema.url(schema_path);
        customize(&mut settings);

        let metrics_collector = Arc::new(MetricsCollector::new().unwrap());
        let renderer =
            Arc::new(FormRenderer::from_settings(&settings, metrics_collector.clone()).unwrap());
        let _ = renderer.load(&settings.schema.api_url).await;

        let health_handler = Arc::new(HealthHandler::new(renderer.clone()));
        let metrics_handler = Arc::new(MetricsHandler::new(metrics_collector));

        let app = dynaform::create_app(renderer.clone(), health_handler, metrics_handler);

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            addr,
            base_url,
            schema,
            renderer,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
