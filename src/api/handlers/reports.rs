use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::incident::ReportSummary;

/// Request body for an on-demand report
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportRequest {
    pub location: Option<String>,
    pub weather_alert: Option<String>,
    pub safety_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateReportResponse {
    pub report: String,
}

/// Generate a city report outside of any workflow run
///
/// POST /generate-report
pub async fn generate_report(
    State(state): State<AppState>,
    Json(req): Json<GenerateReportRequest>,
) -> Result<Json<GenerateReportResponse>, ApiError> {
    let summary = ReportSummary {
        location: req.location,
        weather_alert: req.weather_alert,
        safety_status: req.safety_status,
        ..ReportSummary::at(Utc::now())
    };

    let report = state
        .router
        .reporter()
        .generate(&summary)
        .await
        .map_err(|e| {
            warn!(error = %e, "On-demand report generation failed");
            ApiError::from(e)
        })?;

    Ok(Json(GenerateReportResponse { report }))
}
