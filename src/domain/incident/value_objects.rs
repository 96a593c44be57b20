use serde::{Deserialize, Serialize};

/// Severity assigned by the fire response stage
///
/// Any level string a peer sends that is not one of the known tiers
/// deserializes as `Unknown` instead of failing the whole envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FireLevel {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for FireLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FireLevel::Low => write!(f, "low"),
            FireLevel::Medium => write!(f, "medium"),
            FireLevel::High => write!(f, "high"),
            FireLevel::Unknown => write!(f, "unknown"),
        }
    }
}

/// Inspection outcomes the tiering table knows about
///
/// Status travels on the wire as a free-form string; this type is only
/// used to classify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyStatus {
    Ok,
    Warning,
    Incident,
}

impl SafetyStatus {
    /// Wire spelling of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyStatus::Ok => "OK",
            SafetyStatus::Warning => "Warning",
            SafetyStatus::Incident => "Incident",
        }
    }

    /// Classify a wire status; matching is exact, as the protocol is case-sensitive
    pub fn classify(raw: &str) -> Option<Self> {
        match raw {
            "OK" => Some(SafetyStatus::Ok),
            "Warning" => Some(SafetyStatus::Warning),
            "Incident" => Some(SafetyStatus::Incident),
            _ => None,
        }
    }
}

/// Severity tiering: inspection status to `(level, units)`
///
/// Total over every input string. Unrecognized statuses map to
/// `(Unknown, 0)` rather than an error.
///
/// # Example
/// ```
/// use incident_router::domain::incident::value_objects::{tier_for_status, FireLevel};
///
/// assert_eq!(tier_for_status("Warning"), (FireLevel::Medium, 5));
/// assert_eq!(tier_for_status("smoke?"), (FireLevel::Unknown, 0));
/// ```
pub fn tier_for_status(raw: &str) -> (FireLevel, u32) {
    match SafetyStatus::classify(raw) {
        Some(SafetyStatus::Ok) => (FireLevel::Low, 2),
        Some(SafetyStatus::Warning) => (FireLevel::Medium, 5),
        Some(SafetyStatus::Incident) => (FireLevel::High, 10),
        None => (FireLevel::Unknown, 0),
    }
}
