mod app_init;
mod client;
mod config;
mod domain;
mod id;
mod logging;
mod notifier;
mod result;

use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use compact_str::CompactString;

use crate::{
    app_init::initialize_app,
    config::{BotConfig, Credentials, default_config_path, load_config},
    id::ChatId,
};

/// Watches homework review statuses and reports changes to Telegram
#[derive(Parser)]
#[command(name = "homework-bot", version, about)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Homework statuses endpoint
    #[arg(long)]
    endpoint: Option<CompactString>,

    /// Telegram Bot API base URL
    #[arg(long)]
    telegram_api_url: Option<CompactString>,

    /// Seconds to wait between polls
    #[arg(long, value_name = "SECS")]
    retry_period: Option<u64>,

    /// Seconds before an HTTP request is abandoned
    #[arg(long, value_name = "SECS")]
    request_timeout: Option<u64>,

    /// Log level for the bot's own events (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<CompactString>,

    /// Also write logs to a daily rotated file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[arg(long, env = "PRACTICUM_TOKEN", hide_env_values = true)]
    practicum_token: Option<CompactString>,

    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    telegram_token: Option<CompactString>,

    #[arg(long, env = "TELEGRAM_CHAT_ID", hide_env_values = true, allow_hyphen_values = true)]
    telegram_chat_id: Option<ChatId>,
}

impl Cli {
    /// Apply command line overrides and split off the secrets
    fn apply(self, config: &mut BotConfig) -> Credentials {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(url) = self.telegram_api_url {
            config.telegram_api_url = url;
        }
        if let Some(secs) = self.retry_period {
            config.retry_period_secs = secs;
        }
        if let Some(secs) = self.request_timeout {
            config.request_timeout_secs = secs;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if self.log_dir.is_some() {
            config.log_dir = self.log_dir;
        }
        config.log_json |= self.log_json;

        Credentials {
            practicum_token: self.practicum_token,
            telegram_token: self.telegram_token,
            telegram_chat_id: self.telegram_chat_id,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let mut cli = Cli::parse();
    let config_path = cli.config.take().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path)?;
    let credentials = cli.apply(&mut config);

    let app = initialize_app(config, credentials)?;
    app.poller.run(Utc::now().timestamp()).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_settings() {
        let cli = Cli::parse_from([
            "homework-bot",
            "--retry-period",
            "30",
            "--log-level",
            "info",
            "--practicum-token",
            "p",
            "--telegram-token",
            "t",
            "--telegram-chat-id",
            "-100",
        ]);

        let mut config = BotConfig::default();
        let credentials = cli.apply(&mut config);

        assert_eq!(config.retry_period_secs, 30);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.endpoint, BotConfig::default().endpoint);
        assert!(credentials.missing().is_empty());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
