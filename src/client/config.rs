//! Configuration for the review API client

use std::time::Duration;

use compact_str::CompactString;

use super::error::{ClientError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Main configuration for the review API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Homework statuses endpoint
    pub endpoint: CompactString,
    /// OAuth token sent in the Authorization header
    pub token: CompactString,
    /// Upper bound for a single request
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<CompactString>, token: impl Into<CompactString>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(ClientError::config_validation(
                "endpoint",
                "Endpoint cannot be empty",
            ));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ClientError::config_validation(
                "endpoint",
                "Endpoint must start with http:// or https://",
            ));
        }

        if url::Url::parse(&self.endpoint).is_err() {
            return Err(ClientError::config_validation(
                "endpoint",
                "Endpoint is not a valid URL",
            ));
        }

        if self.token.trim().is_empty() {
            return Err(ClientError::config_validation(
                "practicum_token",
                "Token cannot be empty",
            ));
        }

        if self.timeout.is_zero() {
            return Err(ClientError::config_validation(
                "timeout",
                "Timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    pub(crate) fn authorization(&self) -> String {
        format!("OAuth {}", self.token)
    }
}
