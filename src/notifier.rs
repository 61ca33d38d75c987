//! Delivery of notifications to the Telegram chat

use std::time::Duration;

use async_trait::async_trait;
use compact_str::{CompactString, format_compact};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::{
    id::ChatId,
    result::{BotError, Result},
};

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Sends plain text to a fixed destination
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a ChatId,
    text: &'a str,
}

/// Bot API envelope, only the fields needed to detect failures
#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<CompactString>,
}

#[derive(Debug)]
pub struct TelegramNotifier {
    client: Client,
    api_url: CompactString,
    token: CompactString,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(
        api_url: impl Into<CompactString>,
        token: impl Into<CompactString>,
        chat_id: ChatId,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::InvalidSetting {
                field: "telegram_api_url".into(),
                message: e.to_string().into(),
            })?;

        let api_url: CompactString = api_url.into();
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').into(),
            token: token.into(),
            chat_id,
        })
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    fn send_message_url(&self) -> CompactString {
        format_compact!("{}/bot{}/sendMessage", self.api_url, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, text), fields(chat_id = %self.chat_id))]
    async fn send(&self, text: &str) -> Result<()> {
        let request = SendMessageRequest { chat_id: &self.chat_id, text };

        // The bot token is part of the URL, strip it from every error
        let response = self
            .client
            .post(self.send_message_url().as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::message_not_sent(None, e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                BotError::message_not_sent(Some(status.as_u16()), e.without_url().to_string())
            })?;

        let envelope = serde_json::from_str::<TelegramResponse>(&body).ok();
        match envelope {
            Some(TelegramResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(TelegramResponse { description: Some(description), .. }) => {
                Err(BotError::message_not_sent(Some(status.as_u16()), description))
            },
            _ => Err(BotError::message_not_sent(
                Some(status.as_u16()),
                format_compact!("HTTP {}", status.as_u16()),
            )),
        }
    }
}

/// Deliver `text`, logging the outcome. Failures never propagate.
pub async fn send_message<N: Notifier + ?Sized>(notifier: &N, text: &str) -> bool {
    match notifier.send(text).await {
        Ok(()) => {
            debug!(message = %text, "Message sent");
            true
        },
        Err(e) => {
            error!(error = %e, "Could not send message");
            false
        },
    }
}
