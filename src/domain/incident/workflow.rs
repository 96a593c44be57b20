//! Workflow stage resolution
//!
//! The incident workflow is a linear chain:
//!
//! ```text
//! weather_alert -> safety_monitor -> fire_response -> city_report
//! ```
//!
//! Every envelope carries everything needed to compute the next stage, so
//! resolution is a pure function of the inbound envelope and the clock
//! reading supplied by the caller. No incident state is kept between
//! messages.

use chrono::{DateTime, Utc};

use super::envelope::Envelope;
use super::payloads::{FireResponse, ReportSummary, SafetyInspection, WeatherAlert};
use super::value_objects::{tier_for_status, SafetyStatus};

/// What the router must do in response to one inbound envelope
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Step {
    /// Envelope to send back on the originating connection
    pub reply: Option<Envelope>,
    /// Summary to hand to the report generator after the reply is sent
    pub report: Option<ReportSummary>,
}

/// Inspection triggered by a weather alert
///
/// No inspection subsystem is wired in, so the outcome is always `OK`.
pub fn inspect(alert: &WeatherAlert) -> SafetyInspection {
    SafetyInspection {
        status: SafetyStatus::Ok.as_str().to_string(),
        location: Some(alert.location.clone()),
    }
}

/// Fire response for an inspection result
pub fn dispatch(inspection: &SafetyInspection) -> FireResponse {
    let (level, units) = tier_for_status(&inspection.status);
    FireResponse { level, units }
}

/// Resolve an inbound envelope into the next step of the workflow
pub fn resolve(envelope: &Envelope, now: DateTime<Utc>) -> Step {
    match envelope {
        Envelope::WeatherAlert(alert) => {
            let inspection = inspect(alert);
            Step {
                report: Some(ReportSummary::from_inspection(&inspection, now)),
                reply: Some(Envelope::SafetyMonitor(inspection)),
            }
        }
        Envelope::SafetyMonitor(inspection) => Step {
            reply: Some(Envelope::FireResponse(dispatch(inspection))),
            report: None,
        },
        Envelope::FireResponse(response) => Step {
            reply: None,
            report: Some(ReportSummary::from_dispatch(response, now)),
        },
        // Reports only ever flow outwards
        Envelope::CityReport(_) => Step::default(),
    }
}
