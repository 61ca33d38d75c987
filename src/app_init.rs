use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use crate::{
    client::{ClientConfig, HomeworkPoller, PracticumApi},
    config::{BotConfig, Credentials, ResolvedCredentials},
    logging::{LoggingConfig, init_logging},
    notifier::TelegramNotifier,
    result::{BotError, Result},
};

pub type Poller = HomeworkPoller<PracticumApi, TelegramNotifier>;

pub struct AppComponents {
    pub poller: Poller,
    pub _log_guard: Option<WorkerGuard>,
}

pub fn initialize_app(config: BotConfig, credentials: Credentials) -> Result<AppComponents> {
    let log_guard = init_logging(&LoggingConfig::from_config(&config))?;
    info!(version = env!("CARGO_PKG_VERSION"), "Homework bot starting up");

    if !credentials.check_tokens() {
        let missing = credentials.missing();
        error!(missing = ?missing, "Required environment variables are missing, shutting down");
        return Err(BotError::MissingCredentials { names: missing });
    }
    let credentials = credentials.resolve()?;

    let poller = create_poller(&config, credentials)?;
    info!(
        endpoint = %poller.api().config().endpoint,
        chat_id = %poller.notifier().chat_id(),
        retry_period = ?poller.retry_period(),
        "Homework poller configured"
    );

    Ok(AppComponents { poller, _log_guard: log_guard })
}

fn create_poller(config: &BotConfig, credentials: ResolvedCredentials) -> Result<Poller> {
    config.validate()?;

    let client_config = ClientConfig::new(config.endpoint.clone(), credentials.practicum_token)
        .with_timeout(config.request_timeout());
    let api = PracticumApi::new(client_config)?;

    let notifier = TelegramNotifier::new(
        config.telegram_api_url.clone(),
        credentials.telegram_token,
        credentials.telegram_chat_id,
        config.request_timeout(),
    )?;

    Ok(HomeworkPoller::new(api, notifier, config.retry_period()))
}
