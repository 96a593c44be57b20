use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::incident::{Envelope, SafetyInspection, SafetyStatus};

/// Request body for an externally reported weather alert
#[derive(Debug, Deserialize)]
pub struct WeatherAlertRequest {
    pub alert_type: String,
    pub location: String,
}

/// Response from weather alert ingestion
#[derive(Debug, Serialize)]
pub struct WeatherAlertResponse {
    pub status: String,
    /// Connections the seed envelope was delivered to
    pub delivered: usize,
}

/// Seed the workflow from outside the duplex channel
///
/// Broadcasts a `safety_monitor` envelope with status `OK` to every
/// registered connection.
///
/// POST /events/weather_alert
pub async fn weather_alert(
    State(state): State<AppState>,
    Json(req): Json<WeatherAlertRequest>,
) -> Result<Json<WeatherAlertResponse>, ApiError> {
    let location = req.location.trim();
    if location.is_empty() {
        return Err(ApiError::bad_request("location cannot be empty"));
    }

    info!(alert_type = %req.alert_type, location = %location, "Weather alert received");

    let seed = Envelope::SafetyMonitor(SafetyInspection {
        status: SafetyStatus::Ok.as_str().to_string(),
        location: Some(location.to_string()),
    });
    let delivered = state.router.broadcast(seed).await;

    Ok(Json(WeatherAlertResponse {
        status: "Weather alert sent".to_string(),
        delivered,
    }))
}
