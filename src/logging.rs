//! Tracing setup: stderr always, a daily rotated file when a directory is given

use std::path::PathBuf;

use compact_str::{CompactString, format_compact};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use crate::{
    config::BotConfig,
    result::{BotError, Result},
};

const LOG_FILE_PREFIX: &str = "homework-bot.log";

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level for this crate's own events, dependencies stay at warn
    pub level: CompactString,
    pub log_dir: Option<PathBuf>,
    pub json: bool,
}

impl LoggingConfig {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            level: config.log_level.clone(),
            log_dir: config.log_dir.clone(),
            json: config.log_json,
        }
    }

    fn directive(&self) -> CompactString {
        format_compact!("warn,{}={}", env!("CARGO_CRATE_NAME"), self.level.to_lowercase())
    }

    /// `RUST_LOG` wins over the configured level
    fn filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        EnvFilter::try_new(self.directive().as_str()).map_err(|e| BotError::InvalidSetting {
            field: "log_level".into(),
            message: e.to_string().into(),
        })
    }
}

/// Install the global subscriber. Keep the returned guard alive to flush the file sink.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = config.filter()?;

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if config.json {
        layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
    } else {
        layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
    }

    let guard = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| BotError::InvalidSetting {
                field: "log_dir".into(),
                message: format_compact!("{}: {e}", dir.display()),
            })?;

            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(fmt::layer().with_ansi(false).with_writer(writer).boxed());
            Some(guard)
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| BotError::InvalidSetting {
            field: "logging".into(),
            message: e.to_string().into(),
        })?;

    Ok(guard)
}
