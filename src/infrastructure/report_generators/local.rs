use async_trait::async_trait;

use crate::domain::incident::ReportSummary;
use crate::domain::reporting::{ReportGenerationError, ReportGenerator};

/// Offline report generator used when no API key is configured
///
/// Produces a deterministic placeholder embedding the summary, so the
/// workflow still closes its loop in development.
#[derive(Debug, Clone, Default)]
pub struct LocalReportGenerator;

impl LocalReportGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReportGenerator for LocalReportGenerator {
    async fn generate(&self, summary: &ReportSummary) -> Result<String, ReportGenerationError> {
        let data = serde_json::to_string(summary)
            .map_err(|e| ReportGenerationError::MalformedResponse(format!("summary: {e}")))?;

        Ok(format!(
            "[LOCAL REPORT] City snapshot\n\
             - Data: {data}\n\
             - Tip: Set the DEEPSEEK_API_KEY environment variable to use the real LLM."
        ))
    }
}
