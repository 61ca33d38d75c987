//! Poll loop relaying homework status changes

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, instrument};

use super::HomeworkSource;
use crate::{
    domain::{check_response, parse_status},
    notifier::{Notifier, send_message},
    result::{BotError, Result},
};

pub const DEFAULT_RETRY_PERIOD: Duration = Duration::from_secs(600);

/// What a single poll iteration observed
#[derive(Debug)]
pub enum PollOutcome {
    /// The newest homework changed status, carries the notification text
    StatusChanged(String),
    NoNewStatuses,
    Failed(BotError),
}

/// Result of one iteration: the watermark for the next request and what happened
#[derive(Debug)]
pub struct PollStep {
    pub watermark: i64,
    pub outcome: PollOutcome,
    /// Whether a notification reached the chat during this iteration
    pub delivered: bool,
}

/// Sequential poller for homework review statuses
///
/// Fetches, validates and formats the newest status change every
/// `retry_period`, relaying both updates and failures through the notifier.
#[derive(Debug)]
pub struct HomeworkPoller<A, N> {
    api: A,
    notifier: N,
    retry_period: Duration,
}

impl<A, N> HomeworkPoller<A, N>
where
    A: HomeworkSource,
    N: Notifier,
{
    pub fn new(api: A, notifier: N, retry_period: Duration) -> Self {
        Self { api, notifier, retry_period }
    }

    pub fn retry_period(&self) -> Duration {
        self.retry_period
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Poll forever starting from `watermark`. Never returns.
    #[instrument(skip(self), fields(retry_period = ?self.retry_period))]
    pub async fn run(&self, mut watermark: i64) {
        info!(watermark, "Starting homework poller");

        loop {
            let step = self.poll_once(watermark).await;
            debug!(
                outcome = ?step.outcome,
                delivered = step.delivered,
                watermark = step.watermark,
                "Poll iteration finished"
            );
            watermark = step.watermark;

            sleep(self.retry_period).await;
        }
    }

    /// Run one fetch-validate-format-notify iteration.
    ///
    /// The watermark only advances when the whole iteration succeeds.
    #[instrument(skip(self))]
    pub async fn poll_once(&self, watermark: i64) -> PollStep {
        match self.check_statuses(watermark).await {
            Ok((next, Some(message))) => {
                let delivered = send_message(&self.notifier, &message).await;
                PollStep {
                    watermark: next,
                    outcome: PollOutcome::StatusChanged(message),
                    delivered,
                }
            },
            Ok((next, None)) => {
                debug!("No new statuses in the response");
                PollStep {
                    watermark: next,
                    outcome: PollOutcome::NoNewStatuses,
                    delivered: false,
                }
            },
            Err(e) => {
                let message = failure_message(&e);
                error!(kind = ?e.kind(), "{message}");
                let delivered = send_message(&self.notifier, &message).await;
                PollStep {
                    watermark,
                    outcome: PollOutcome::Failed(e),
                    delivered,
                }
            },
        }
    }

    async fn check_statuses(&self, watermark: i64) -> Result<(i64, Option<String>)> {
        let response = self.api.get_api_answer(Some(watermark)).await?;
        let checked = check_response(&response)?;

        // Only the newest entry is reported
        let message = checked.homeworks.first().map(parse_status).transpose()?;

        Ok((checked.current_date, message))
    }
}

/// Text relayed to the chat when an iteration fails
pub fn failure_message(error: &BotError) -> String {
    format!("Сбой в работе программы: {error}")
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::HomeworkStatus;

    #[derive(Default)]
    struct ScriptedSource {
        answers: Mutex<VecDeque<Result<Value>>>,
        requested: Mutex<Vec<Option<i64>>>,
    }

    impl ScriptedSource {
        fn with(answers: Vec<Result<Value>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                ..Default::default()
            }
        }

        fn requested(&self) -> Vec<Option<i64>> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HomeworkSource for ScriptedSource {
        async fn get_api_answer(&self, timestamp: Option<i64>) -> Result<Value> {
            self.requested.lock().unwrap().push(timestamp);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(json!({"homeworks": [], "current_date": timestamp})))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        broken: bool,
    }

    impl RecordingNotifier {
        fn broken() -> Self {
            Self { broken: true, ..Default::default() }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<()> {
            if self.broken {
                return Err(BotError::message_not_sent(None, "connection reset"));
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn transport_error() -> BotError {
        BotError::Transport {
            endpoint: "https://example.com/".into(),
            message: "connection refused".into(),
        }
    }

    fn reviewing_text(name: &str) -> String {
        format!(
            "Изменился статус проверки работы \"{name}\". {}",
            HomeworkStatus::Reviewing.verdict()
        )
    }

    #[tokio::test]
    async fn status_change_is_sent_once_and_watermark_advances() {
        let source = ScriptedSource::with(vec![Ok(json!({
            "homeworks": [{"homework_name": "hw2", "status": "reviewing"}],
            "current_date": 1000
        }))]);
        let poller = HomeworkPoller::new(source, RecordingNotifier::default(), DEFAULT_RETRY_PERIOD);

        let step = poller.poll_once(500).await;
        assert_eq!(step.watermark, 1000);
        assert!(step.delivered);
        assert!(matches!(step.outcome, PollOutcome::StatusChanged(ref m) if *m == reviewing_text("hw2")));
        assert_eq!(poller.notifier.sent(), vec![reviewing_text("hw2")]);

        let next = poller.poll_once(step.watermark).await;
        assert!(matches!(next.outcome, PollOutcome::NoNewStatuses));
        assert_eq!(poller.api.requested(), vec![Some(500), Some(1000)]);
        assert_eq!(poller.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn only_the_newest_homework_is_reported() {
        let source = ScriptedSource::with(vec![Ok(json!({
            "homeworks": [
                {"homework_name": "new", "status": "reviewing"},
                {"homework_name": "old", "status": "approved"}
            ],
            "current_date": 10
        }))]);
        let poller = HomeworkPoller::new(source, RecordingNotifier::default(), DEFAULT_RETRY_PERIOD);

        poller.poll_once(1).await;
        assert_eq!(poller.notifier.sent(), vec![reviewing_text("new")]);
    }

    #[tokio::test]
    async fn empty_batch_advances_watermark_silently() {
        let source = ScriptedSource::with(vec![Ok(json!({"homeworks": [], "current_date": 77}))]);
        let poller = HomeworkPoller::new(source, RecordingNotifier::default(), DEFAULT_RETRY_PERIOD);

        let step = poller.poll_once(5).await;
        assert_eq!(step.watermark, 77);
        assert!(!step.delivered);
        assert!(poller.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_watermark_and_reports() {
        let source = ScriptedSource::with(vec![Err(transport_error())]);
        let poller = HomeworkPoller::new(source, RecordingNotifier::default(), DEFAULT_RETRY_PERIOD);

        let step = poller.poll_once(500).await;
        assert_eq!(step.watermark, 500);
        assert!(matches!(step.outcome, PollOutcome::Failed(BotError::Transport { .. })));
        assert_eq!(poller.notifier.sent(), vec![failure_message(&transport_error())]);
    }

    #[tokio::test]
    async fn unknown_status_is_reported_without_advancing() {
        let source = ScriptedSource::with(vec![Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "lost"}],
            "current_date": 900
        }))]);
        let poller = HomeworkPoller::new(source, RecordingNotifier::default(), DEFAULT_RETRY_PERIOD);

        let step = poller.poll_once(100).await;
        assert_eq!(step.watermark, 100);
        let sent = poller.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Сбой в работе программы:"));
        assert!(sent[0].contains("lost"));
    }

    #[tokio::test]
    async fn broken_notifier_does_not_stop_progress() {
        let source = ScriptedSource::with(vec![Ok(json!({
            "homeworks": [{"homework_name": "hw1", "status": "approved"}],
            "current_date": 300
        }))]);
        let poller = HomeworkPoller::new(source, RecordingNotifier::broken(), DEFAULT_RETRY_PERIOD);

        let step = poller.poll_once(200).await;
        assert_eq!(step.watermark, 300);
        assert!(!step.delivered);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_retries_after_each_period_with_same_watermark_on_failure() {
        let source = ScriptedSource::with(vec![
            Ok(json!({
                "homeworks": [{"homework_name": "hw2", "status": "reviewing"}],
                "current_date": 1000
            })),
            Err(transport_error()),
            Ok(json!({"homeworks": [], "current_date": 2000})),
        ]);
        let poller = HomeworkPoller::new(source, RecordingNotifier::default(), DEFAULT_RETRY_PERIOD);

        // Iterations at 0s, 600s and 1200s fit before the deadline
        let result = tokio::time::timeout(Duration::from_secs(1500), poller.run(500)).await;
        assert!(result.is_err());

        assert_eq!(poller.api.requested(), vec![Some(500), Some(1000), Some(1000)]);
        assert_eq!(
            poller.notifier.sent(),
            vec![reviewing_text("hw2"), failure_message(&transport_error())]
        );
    }
}
