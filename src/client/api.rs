//! Core HTTP client for the homework review API

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{
    config::ClientConfig,
    error::{ClientError, Result},
};

/// Anything the poll loop can ask for the latest homework statuses
#[async_trait]
pub trait HomeworkSource: Send + Sync {
    /// Fetch raw statuses changed since `timestamp` (now when absent or zero)
    async fn get_api_answer(&self, timestamp: Option<i64>) -> crate::result::Result<Value>;
}

/// Pure HTTP client for the review API
#[derive(Debug)]
pub struct PracticumApi {
    client: Client,
    config: ClientConfig,
}

impl PracticumApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::transport(config.endpoint.clone(), e))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get homework statuses updated since `from_date`
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub async fn get_homework_statuses(&self, from_date: i64) -> Result<Value> {
        let response = self
            .client
            .get(self.config.endpoint.as_str())
            .header("Authorization", self.config.authorization())
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                let err = ClientError::transport(self.config.endpoint.clone(), e);
                debug!(error = %err, "Request to the review endpoint failed");
                err
            })?;

        self.handle_response(response).await
    }

    /// Check the status code and deserialize the JSON body
    async fn handle_response(&self, response: Response) -> Result<Value> {
        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Review endpoint is unavailable");
            return Err(ClientError::UnexpectedStatus {
                endpoint: self.config.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::transport(self.config.endpoint.clone(), e))?;

        let value = serde_json::from_str(&body).map_err(|e| {
            debug!(body = %body, "Unparseable response body");
            ClientError::json_parse(
                self.config.endpoint.clone(),
                "Failed to parse response",
                e,
            )
        })?;

        debug!("Successfully fetched homework statuses");
        Ok(value)
    }
}

#[async_trait]
impl HomeworkSource for PracticumApi {
    async fn get_api_answer(&self, timestamp: Option<i64>) -> crate::result::Result<Value> {
        let from_date = resolve_from_date(timestamp);
        Ok(self.get_homework_statuses(from_date).await?)
    }
}

/// Absent and zero timestamps both fall back to the current time
pub fn resolve_from_date(timestamp: Option<i64>) -> i64 {
    match timestamp {
        Some(ts) if ts != 0 => ts,
        _ => Utc::now().timestamp(),
    }
}
