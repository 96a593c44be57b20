use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

use super::payloads::{CityReport, FireResponse, SafetyInspection, WeatherAlert};

/// Workflow stage tags carried in the envelope `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    WeatherAlert,
    SafetyMonitor,
    FireResponse,
    CityReport,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::WeatherAlert => "weather_alert",
            Stage::SafetyMonitor => "safety_monitor",
            Stage::FireResponse => "fire_response",
            Stage::CityReport => "city_report",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weather_alert" => Ok(Stage::WeatherAlert),
            "safety_monitor" => Ok(Stage::SafetyMonitor),
            "fire_response" => Ok(Stage::FireResponse),
            "city_report" => Ok(Stage::CityReport),
            other => Err(EnvelopeError::UnknownStage(other.to_string())),
        }
    }
}

/// Reasons an inbound frame cannot become an [`Envelope`]
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown stage: {0}")]
    UnknownStage(String),
}

/// The unit of exchange on every duplex connection
///
/// Serializes as `{"type": <stage>, "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Envelope {
    WeatherAlert(WeatherAlert),
    SafetyMonitor(SafetyInspection),
    FireResponse(FireResponse),
    CityReport(CityReport),
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default = "empty_payload")]
    payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

impl Envelope {
    /// Parse a text frame
    ///
    /// The stage tag is checked before the payload, so an unknown tag is
    /// always reported as [`EnvelopeError::UnknownStage`] regardless of
    /// what its payload looks like.
    pub fn parse(text: &str) -> Result<Self, EnvelopeError> {
        let raw: RawEnvelope = serde_json::from_str(text)?;
        let stage: Stage = raw.kind.parse()?;

        let envelope = match stage {
            Stage::WeatherAlert => Envelope::WeatherAlert(serde_json::from_value(raw.payload)?),
            Stage::SafetyMonitor => Envelope::SafetyMonitor(serde_json::from_value(raw.payload)?),
            Stage::FireResponse => Envelope::FireResponse(serde_json::from_value(raw.payload)?),
            Stage::CityReport => Envelope::CityReport(serde_json::from_value(raw.payload)?),
        };

        Ok(envelope)
    }

    pub fn stage(&self) -> Stage {
        match self {
            Envelope::WeatherAlert(_) => Stage::WeatherAlert,
            Envelope::SafetyMonitor(_) => Stage::SafetyMonitor,
            Envelope::FireResponse(_) => Stage::FireResponse,
            Envelope::CityReport(_) => Stage::CityReport,
        }
    }

    /// Serialize to a single JSON text frame
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
