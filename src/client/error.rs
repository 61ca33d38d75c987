//! Error types for the review API client

use compact_str::CompactString;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request to {endpoint} failed: {source}")]
    Http {
        endpoint: CompactString,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: CompactString },

    #[error("{endpoint} responded with HTTP {status}")]
    UnexpectedStatus { endpoint: CompactString, status: u16 },

    #[error("JSON parse error from {endpoint}: {message}")]
    JsonParse {
        endpoint: CompactString,
        message: CompactString,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid {field}: {message}")]
    ConfigValidation {
        field: CompactString,
        message: CompactString,
    },
}

impl ClientError {
    /// Classify a transport failure, keeping timeouts distinguishable
    pub fn transport(endpoint: impl Into<CompactString>, source: reqwest::Error) -> Self {
        let endpoint = endpoint.into();
        if source.is_timeout() {
            Self::Timeout { endpoint }
        } else {
            // endpoint is reported on its own, without the query string
            Self::Http { endpoint, source: source.without_url() }
        }
    }

    pub fn json_parse(
        endpoint: impl Into<CompactString>,
        message: impl Into<CompactString>,
        source: serde_json::Error,
    ) -> Self {
        Self::JsonParse {
            endpoint: endpoint.into(),
            message: message.into(),
            source,
        }
    }

    pub fn config_validation(
        field: impl Into<CompactString>,
        message: impl Into<CompactString>,
    ) -> Self {
        Self::ConfigValidation { field: field.into(), message: message.into() }
    }
}
