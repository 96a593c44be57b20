use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use incident_router::agents::{ConnectionRegistry, EventRouter};
use incident_router::api::{self, AppState};
use incident_router::config::AppConfig;
use incident_router::domain::reporting::ReportGenerator;
use incident_router::infrastructure::report_generators::{
    ChatCompletionReportGenerator, LocalReportGenerator,
};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("incident_router=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Pick the report generator
    let reporter: Arc<dyn ReportGenerator> = match config.report.chat.clone() {
        Some(chat) => {
            tracing::info!(
                model = %chat.model,
                base_url = %chat.base_url,
                "Using chat-completion report generator"
            );
            Arc::new(
                ChatCompletionReportGenerator::new(chat)
                    .expect("Failed to build report generator"),
            )
        }
        None => {
            tracing::warn!("DEEPSEEK_API_KEY not set, using local placeholder reports");
            Arc::new(LocalReportGenerator::new())
        }
    };

    let registry = Arc::new(ConnectionRegistry::new());
    let router = Arc::new(EventRouter::new(registry, reporter));

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = api::routes(AppState::new(Arc::clone(&router), config.heartbeat))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    router.shutdown().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
