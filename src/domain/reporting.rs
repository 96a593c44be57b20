use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::incident::ReportSummary;

/// Failure of a single report generation call
#[derive(Debug, Error)]
pub enum ReportGenerationError {
    #[error("report generator not configured: {0}")]
    NotConfigured(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed generator response: {0}")]
    MalformedResponse(String),
}

impl ReportGenerationError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ReportGenerationError::Transport(_) | ReportGenerationError::Timeout(_) => true,
            ReportGenerationError::Status { status, .. } => *status == 429 || *status >= 500,
            ReportGenerationError::NotConfigured(_)
            | ReportGenerationError::MalformedResponse(_) => false,
        }
    }
}

/// Port for the external text-generation service
///
/// One call produces one natural-language report for one incident summary.
/// Implementations must not cache: every call is a fresh generation.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, summary: &ReportSummary) -> Result<String, ReportGenerationError>;
}
