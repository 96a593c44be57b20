use thiserror::Error;

use super::registry::ConnectionId;
use crate::domain::incident::EnvelopeError;
use crate::domain::reporting::ReportGenerationError;

/// Errors that can occur while routing a single inbound message
///
/// All of these are scoped to one connection or one call; none of them
/// ever escapes the connection handler.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Report generation failed: {0}")]
    ReportGeneration(#[from] ReportGenerationError),

    #[error("Send to connection {0} failed")]
    SendFailure(ConnectionId),
}

impl From<EnvelopeError> for RouterError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Malformed(e) => RouterError::MalformedEnvelope(e),
            EnvelopeError::UnknownStage(stage) => RouterError::UnknownStage(stage),
        }
    }
}

pub type RouterResult<T> = Result<T, RouterError>;
