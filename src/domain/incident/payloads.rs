use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::value_objects::FireLevel;

/// Payload of a `weather_alert` envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<String>,
}

/// Payload of a `safety_monitor` envelope
///
/// `status` is kept as the raw wire string so that any value, known or
/// not, can be tiered. Non-string values are accepted and never match a
/// known status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyInspection {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Payload of a `fire_response` envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireResponse {
    #[serde(default = "unknown_level", deserialize_with = "lenient_level")]
    pub level: FireLevel,
    #[serde(default)]
    pub units: u32,
}

fn unknown_level() -> FireLevel {
    FireLevel::Unknown
}

/// `null` reads as an empty status, other non-strings as their JSON text
fn lenient_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(status) => status,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Anything that is not a level string reads as `Unknown`
fn lenient_level<'de, D>(deserializer: D) -> Result<FireLevel, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or(FireLevel::Unknown))
}

/// Payload of a `city_report` envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityReport {
    pub report: String,
}

/// Structured incident summary handed to the report generator
///
/// Absent fields are omitted from the serialized form so the generator
/// only sees what the triggering stage actually knew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_level: Option<FireLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units_dispatched: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_alert: Option<String>,
}

impl ReportSummary {
    /// Empty summary stamped at `timestamp`
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            fire_level: None,
            units_dispatched: None,
            location: None,
            safety_status: None,
            weather_alert: None,
        }
    }

    /// Summary of a dispatch decision (terminal stage)
    pub fn from_dispatch(response: &FireResponse, timestamp: DateTime<Utc>) -> Self {
        Self {
            fire_level: Some(response.level),
            units_dispatched: Some(response.units),
            ..Self::at(timestamp)
        }
    }

    /// Summary of an inspection result (early report)
    pub fn from_inspection(inspection: &SafetyInspection, timestamp: DateTime<Utc>) -> Self {
        Self {
            location: inspection.location.clone(),
            safety_status: Some(inspection.status.clone()),
            ..Self::at(timestamp)
        }
    }
}
