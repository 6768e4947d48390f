//! MD Server
//!
//! HTTP server for the kitchen and furniture workshop service.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, extract::State, routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use md_api::{ApiResult, AppState};
use md_core::config::{AppConfig, LogFormat};
use md_documents::LocalStorage;
use md_store::DataDir;

mod health;

use health::HealthChecker;

/// Mock dataset served to the web client
const MOCK_DATA_FILE: &str = "mockData.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let loaded = AppConfig::from_env();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize structured logging
    init_tracing(config.logging.format);
    if let Err(e) = &loaded {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        data_dir = %config.data.dir.display(),
        docs_dir = %config.documents.dir.display(),
        "Starting MD server"
    );

    let data = DataDir::open(&config.data.dir).await?;
    let storage = Arc::new(LocalStorage::new(&config.documents.dir));
    let state = AppState::new(
        data.clone(),
        storage,
        config.documents.max_upload_bytes as u64,
    );
    let health = Arc::new(HealthChecker::new(data, &config.documents.dir));

    let app = build_router(state, health, &config);

    // Start server
    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,md_server=debug,md_api=debug,tower_http=debug".into());

    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .init(),
    }
}

/// Build the application router
fn build_router(state: AppState, health: Arc<HealthChecker>, config: &AppConfig) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health);

    let api_routes = md_api::router()
        .route("/data/mockData.json", get(mock_data))
        .with_state(state);

    // Multipart bodies carry some framing on top of the file itself
    let body_limit = config.documents.max_upload_bytes + 64 * 1024;

    Router::new()
        .merge(health_routes)
        .merge(api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.request_timeout_seconds,
                )))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

/// GET /data/mockData.json
async fn mock_data(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(state.catalog.raw(MOCK_DATA_FILE).await?))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
