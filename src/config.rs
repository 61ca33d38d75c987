use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use compact_str::CompactString;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{
    client::{config::DEFAULT_ENDPOINT, poller::DEFAULT_RETRY_PERIOD},
    id::ChatId,
    notifier::DEFAULT_TELEGRAM_API_URL,
    result::{BotError, Result},
};

/// Non-secret settings, optionally read from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub endpoint: CompactString,
    pub telegram_api_url: CompactString,
    pub retry_period_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: CompactString,
    pub log_dir: Option<PathBuf>,
    pub log_json: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            telegram_api_url: DEFAULT_TELEGRAM_API_URL.into(),
            retry_period_secs: DEFAULT_RETRY_PERIOD.as_secs(),
            request_timeout_secs: 30,
            log_level: "debug".into(),
            log_dir: None,
            log_json: false,
        }
    }
}

impl BotConfig {
    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.retry_period_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject settings the poll loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retry_period_secs == 0 {
            return Err(BotError::InvalidSetting {
                field: "retry_period_secs".into(),
                message: "Retry period must be greater than zero".into(),
            });
        }

        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = BaseDirs::new() {
        dirs.config_dir().join("homework-bot.toml")
    } else {
        PathBuf::from("homework-bot.toml")
    }
}

/// Load settings from `path`, falling back to defaults when the file is absent
pub fn load_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        return Ok(BotConfig::default());
    }

    confy::load_path(path).map_err(|e| BotError::config_error(path.to_path_buf(), e))
}

/// Secrets taken from the environment
#[derive(Clone, Default)]
pub struct Credentials {
    pub practicum_token: Option<CompactString>,
    pub telegram_token: Option<CompactString>,
    pub telegram_chat_id: Option<ChatId>,
}

/// Credentials after every value has been confirmed present
#[derive(Clone)]
pub struct ResolvedCredentials {
    pub practicum_token: CompactString,
    pub telegram_token: CompactString,
    pub telegram_chat_id: ChatId,
}

impl Credentials {
    /// Names of absent or blank credentials, in a fixed order
    pub fn missing(&self) -> Vec<&'static str> {
        let has_text = |value: &Option<CompactString>| {
            value.as_ref().is_some_and(|v| !v.trim().is_empty())
        };

        [
            ("PRACTICUM_TOKEN", has_text(&self.practicum_token)),
            ("TELEGRAM_TOKEN", has_text(&self.telegram_token)),
            (
                "TELEGRAM_CHAT_ID",
                self.telegram_chat_id.as_ref().is_some_and(|id| !id.is_empty()),
            ),
        ]
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect()
    }

    /// Log every missing credential and report whether all are present
    pub fn check_tokens(&self) -> bool {
        let missing = self.missing();
        for name in &missing {
            error!(variable = *name, "{name} not found");
        }
        missing.is_empty()
    }

    pub fn resolve(self) -> Result<ResolvedCredentials> {
        let names = self.missing();
        match (self.practicum_token, self.telegram_token, self.telegram_chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id))
                if names.is_empty() =>
            {
                Ok(ResolvedCredentials {
                    practicum_token,
                    telegram_token,
                    telegram_chat_id,
                })
            },
            _ => Err(BotError::MissingCredentials { names }),
        }
    }
}
