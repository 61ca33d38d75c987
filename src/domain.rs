use std::str::FromStr;

use compact_str::CompactString;
use serde_json::Value;

use crate::result::{BotError, Result};

/// Review status of a single homework submission
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Human-readable verdict sent to the chat
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        HomeworkStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| BotError::UnknownStatus { status: s.into() })
    }
}

/// A response that passed shape validation
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedResponse<'a> {
    /// Newest first, elements are not validated yet
    pub homeworks: &'a [Value],
    pub current_date: i64,
}

/// Validate the shape of a review API answer.
///
/// Checks run in order: the answer must be an object, both `homeworks` and
/// `current_date` must be present and non-null, and `homeworks` must be a list.
pub fn check_response(response: &Value) -> Result<CheckedResponse<'_>> {
    let object = response.as_object().ok_or(BotError::ResponseNotObject)?;

    let homeworks = object
        .get("homeworks")
        .filter(|v| !v.is_null())
        .ok_or(BotError::MissingResponseKey { key: "homeworks" })?;
    let current_date = object
        .get("current_date")
        .filter(|v| !v.is_null())
        .ok_or(BotError::MissingResponseKey { key: "current_date" })?;

    let homeworks = homeworks.as_array().ok_or(BotError::HomeworksNotList)?;
    let current_date = current_date.as_i64().ok_or(BotError::InvalidCurrentDate)?;

    Ok(CheckedResponse { homeworks, current_date })
}

/// Turn one homework record into the status change notification
pub fn parse_status(homework: &Value) -> Result<String> {
    let name = homework
        .get("homework_name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or(BotError::MissingHomeworkName)?;

    let status = match homework.get("status") {
        Some(Value::String(status)) => status.parse::<HomeworkStatus>()?,
        Some(other) => {
            return Err(BotError::UnknownStatus {
                status: CompactString::from(other.to_string()),
            });
        },
        None => return Err(BotError::UnknownStatus { status: "None".into() }),
    };

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {}",
        status.verdict()
    ))
}
