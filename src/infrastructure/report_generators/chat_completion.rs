//! OpenAI-compatible chat-completions report generator
//!
//! Defaults target DeepSeek. One request per report: a single role-tagged
//! instruction embedding the JSON summary; the first returned choice is
//! the report.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::agents::prompts::{library, PromptTemplate};
use crate::domain::incident::ReportSummary;
use crate::domain::reporting::{ReportGenerationError, ReportGenerator};
use crate::infrastructure::retry::{retry_with_backoff, RetryPolicy};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Default model
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat-completions client configuration
#[derive(Clone)]
pub struct ChatCompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Bound on each attempt, connect to last byte
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

// The key never reaches logs
impl fmt::Debug for ChatCompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ChatCompletionConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Report generator backed by a chat-completions endpoint
pub struct ChatCompletionReportGenerator {
    client: Client,
    config: ChatCompletionConfig,
    prompt: PromptTemplate,
}

impl ChatCompletionReportGenerator {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ChatCompletionConfig) -> Result<Self, ReportGenerationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ReportGenerationError::NotConfigured(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            config,
            prompt: library::city_report(),
        })
    }

    fn build_messages(
        &self,
        summary: &ReportSummary,
    ) -> Result<Vec<ChatMessage>, ReportGenerationError> {
        let serialized = serde_json::to_string(summary)
            .map_err(|e| ReportGenerationError::MalformedResponse(format!("summary: {e}")))?;

        let mut vars = HashMap::new();
        vars.insert("summary".to_string(), serialized);

        Ok(vec![ChatMessage {
            role: self.prompt.role.clone(),
            content: self.prompt.render(&vars),
        }])
    }

    async fn attempt(&self, messages: &[ChatMessage]) -> Result<String, ReportGenerationError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, model = %self.config.model, "Requesting report");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportGenerationError::Status {
                status: status.as_u16(),
                body: truncate(&body, 300),
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ReportGenerationError::MalformedResponse(e.to_string()))?;

        let choice = chat.choices.into_iter().next().ok_or_else(|| {
            ReportGenerationError::MalformedResponse("no choices in response".into())
        })?;

        choice
            .message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ReportGenerationError::MalformedResponse("empty message content".into()))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ReportGenerationError {
        if e.is_timeout() {
            ReportGenerationError::Timeout(self.config.timeout)
        } else {
            ReportGenerationError::Transport(e.to_string())
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...(truncated)", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl ReportGenerator for ChatCompletionReportGenerator {
    #[instrument(skip(self, summary))]
    async fn generate(&self, summary: &ReportSummary) -> Result<String, ReportGenerationError> {
        let messages = self.build_messages(summary)?;
        let messages = messages.as_slice();
        debug!(
            prompt = %self.prompt.name,
            prompt_version = %self.prompt.version,
            "Rendered report instruction"
        );

        retry_with_backoff(
            &self.config.retry,
            move || self.attempt(messages),
            ReportGenerationError::is_retryable,
        )
        .await
    }
}
