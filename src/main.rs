use clap::Parser;
use dynaform::adapters::form_renderer::FormRenderer;
use dynaform::adapters::health_handler::HealthHandler;
use dynaform::adapters::metrics_handler::{MetricsCollector, MetricsHandler};
use dynaform::cli::Cli;
use dynaform::config::{watcher::ConfigWatcher, Settings};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Load configuration (CLI > env vars > config file)
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let api_url = settings.schema.api_url.clone();

    let metrics = Arc::new(MetricsCollector::new()?);
    let renderer = Arc::new(FormRenderer::from_settings(&settings, metrics.clone())?);

    if cli.render_once {
        println!("{}", renderer.render_once(&api_url).await?);
        return Ok(());
    }

    info!("Starting Dynaform server on {}:{}", host, port);

    // Initial schema fetch runs in the background; the form renders empty until it lands
    renderer.reload(api_url);

    // Wrap settings in Arc<RwLock> for live reload
    let settings = Arc::new(RwLock::new(settings));

    // Start config watcher
    let settings_for_watcher = settings.clone();
    let renderer_for_watcher = renderer.clone();
    let runtime = tokio::runtime::Handle::current();
    let cli_for_watcher = cli.clone();
    let _watcher = ConfigWatcher::new(&cli.config, move || {
        match Settings::new_with_cli(&cli_for_watcher) {
            Ok(new_settings) => {
                let new_url = new_settings.schema.api_url.clone();
                let url_changed = {
                    let mut w = settings_for_watcher.blocking_write();
                    let changed = w.schema.api_url != new_url;
                    *w = new_settings;
                    changed
                };
                info!("Configuration reloaded successfully");

                if url_changed {
                    info!("Schema URL changed, re-fetching form from {}", new_url);
                    let renderer = renderer_for_watcher.clone();
                    runtime.spawn(async move {
                        match renderer.refresh(Some(new_url)).await {
                            Ok(outcome) => info!("Schema refresh finished: {:?}", outcome),
                            Err(e) => error!("Schema refresh failed: {}", e),
                        }
                    });
                }
            }
            Err(e) => error!("Failed to reload configuration: {}", e),
        }
    })?;

    // Initialize handlers
    let health_handler = Arc::new(HealthHandler::new(renderer.clone()));
    let metrics_handler = Arc::new(MetricsHandler::new(metrics));

    // Create application using the library function
    let app = dynaform::create_app(renderer, health_handler, metrics_handler);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
