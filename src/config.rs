//! Environment-driven configuration
//!
//! Every key is optional. Values that are present but unparsable are
//! reported at startup instead of silently falling back.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::infrastructure::report_generators::chat_completion::{
    ChatCompletionConfig, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use crate::infrastructure::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// WebSocket keep-alive settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub ping_interval: Duration,
    pub idle_timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// Report generation settings
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// `None` selects the local placeholder generator
    pub chat: Option<ChatCompletionConfig>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub report: ReportConfig,
    pub heartbeat: HeartbeatConfig,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host: IpAddr = parse_or(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(&lookup, "PORT", 3002)?;

        let api_key = lookup("DEEPSEEK_API_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let chat = match api_key {
            Some(api_key) => {
                let retry = RetryPolicy::default()
                    .with_max_attempts(parse_or(&lookup, "REPORT_MAX_ATTEMPTS", 1)?)
                    .with_initial_delay(Duration::from_millis(parse_or(
                        &lookup,
                        "REPORT_BACKOFF_MS",
                        500,
                    )?))
                    .with_max_delay(Duration::from_millis(parse_or(
                        &lookup,
                        "REPORT_MAX_BACKOFF_MS",
                        8000,
                    )?));

                Some(
                    ChatCompletionConfig::new(api_key)
                        .with_base_url(
                            lookup("DEEPSEEK_BASE_URL")
                                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                        )
                        .with_model(
                            lookup("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                        )
                        .with_timeout(Duration::from_secs(positive_or(
                            &lookup,
                            "REPORT_TIMEOUT_SECS",
                            30,
                        )?))
                        .with_retry(retry),
                )
            }
            None => None,
        };

        let ping_secs = positive_or(&lookup, "WS_PING_INTERVAL_SECS", 30)?;
        let idle_secs = positive_or(&lookup, "WS_IDLE_TIMEOUT_SECS", 60)?;
        // A quiet client only shows activity by answering pings
        if ping_secs >= idle_secs {
            return Err(ConfigError::InvalidValue {
                key: "WS_PING_INTERVAL_SECS",
                value: ping_secs.to_string(),
                reason: format!("must be less than WS_IDLE_TIMEOUT_SECS ({idle_secs})"),
            });
        }

        let heartbeat = HeartbeatConfig {
            ping_interval: Duration::from_secs(ping_secs),
            idle_timeout: Duration::from_secs(idle_secs),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            report: ReportConfig { chat },
            heartbeat,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        None => Ok(default),
    }
}

fn positive_or<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::InvalidValue {
            key,
            value: "0".to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        value => Ok(value),
    }
}
