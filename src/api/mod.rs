// API layer module (adapters for the duplex channel and HTTP ingestion)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};

use handlers::{events, health, reports, ws};
pub use state::AppState;

/// Build the application routes
///
/// The WebSocket channel and the HTTP endpoints share one listener.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(ws::ws_handler))
        .route("/events/weather_alert", post(events::weather_alert))
        .route("/generate-report", post(reports::generate_report))
        .with_state(state)
}
