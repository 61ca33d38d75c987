use std::path::PathBuf;

use compact_str::CompactString;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

/// Coarse classification of everything that can go wrong in the bot
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Protocol,
    Shape,
    Domain,
}

#[derive(Debug, Clone, Error)]
pub enum BotError {
    #[error("Отсутствуют переменные окружения: {}", names.join(", "))]
    MissingCredentials { names: Vec<&'static str> },

    #[error("Не удалось загрузить конфигурацию из {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Некорректная настройка {field}: {message}")]
    InvalidSetting {
        field: CompactString,
        message: CompactString,
    },

    #[error("Ошибка при запросе к эндпоинту {endpoint}: {message}")]
    Transport {
        endpoint: CompactString,
        message: CompactString,
    },

    #[error("Недоступность эндпоинта {endpoint}. Код ответа API: {status}")]
    UnexpectedStatus { endpoint: CompactString, status: u16 },

    #[error("Ответ эндпоинта {endpoint} не является корректным JSON: {message}")]
    MalformedJson {
        endpoint: CompactString,
        message: CompactString,
    },

    #[error("Ответ API не является словарем.")]
    ResponseNotObject,

    #[error("Ошибка в получении значений словаря: {key}")]
    MissingResponseKey { key: &'static str },

    #[error("Ответ API не соответствует ожиданиям: homeworks не является списком.")]
    HomeworksNotList,

    #[error("Ответ API не соответствует ожиданиям: current_date не является целым числом.")]
    InvalidCurrentDate,

    #[error("Отсутствует или пустое поле: homework_name")]
    MissingHomeworkName,

    #[error("Неизвестный статус: {status}")]
    UnknownStatus { status: CompactString },

    #[error("Не удалось отправить сообщение: {reason}")]
    MessageNotSent {
        status: Option<u16>,
        reason: CompactString,
    },
}

impl BotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BotError::MissingCredentials { .. }
            | BotError::Config { .. }
            | BotError::InvalidSetting { .. } => ErrorKind::Configuration,
            BotError::Transport { .. } | BotError::MessageNotSent { .. } => ErrorKind::Transport,
            BotError::UnexpectedStatus { .. } | BotError::MalformedJson { .. } => {
                ErrorKind::Protocol
            },
            BotError::ResponseNotObject
            | BotError::MissingResponseKey { .. }
            | BotError::HomeworksNotList
            | BotError::InvalidCurrentDate => ErrorKind::Shape,
            BotError::MissingHomeworkName | BotError::UnknownStatus { .. } => ErrorKind::Domain,
        }
    }

    /// Create a configuration load error
    pub fn config_error(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::Config { path, message: source.to_string() }
    }

    /// Create a message delivery error
    pub fn message_not_sent(status: Option<u16>, reason: impl Into<CompactString>) -> Self {
        Self::MessageNotSent { status, reason: reason.into() }
    }
}

impl From<crate::client::ClientError> for BotError {
    fn from(e: crate::client::ClientError) -> Self {
        use crate::client::ClientError;

        match e {
            ClientError::UnexpectedStatus { endpoint, status } => {
                BotError::UnexpectedStatus { endpoint, status }
            },
            ClientError::JsonParse { endpoint, message, .. } => {
                BotError::MalformedJson { endpoint, message }
            },
            ClientError::Http { endpoint, source } => BotError::Transport {
                endpoint,
                message: source.to_string().into(),
            },
            ClientError::Timeout { endpoint } => BotError::Transport {
                endpoint,
                message: "превышено время ожидания ответа".into(),
            },
            ClientError::ConfigValidation { field, message } => {
                BotError::InvalidSetting { field, message }
            },
        }
    }
}
