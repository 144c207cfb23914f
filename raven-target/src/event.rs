//! Log events as delivered to the target by the host pipeline.

use std::{collections::HashMap, sync::Arc};

use strum::{Display, EnumString};
use time::OffsetDateTime;
use tokio::sync::oneshot;

use crate::error::RavenTargetError;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// One emitted log event.
///
/// Carries the severity, the logger that emitted it, the rendered message,
/// optional associated error information, and an arbitrary property map used
/// as template-rendering context by [`Layout`](crate::Layout).
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: OffsetDateTime,
    pub level: Level,
    pub logger: String,
    pub message: String,
    pub exception: Option<String>,
    pub properties: HashMap<String, String>,
}

impl LogEvent {
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            level,
            logger: logger.into(),
            message: message.into(),
            exception: None,
            properties: HashMap::new(),
        }
    }

    /// A synthetic event with no content.
    ///
    /// Configuration values that are themselves templates are resolved
    /// against this event once, at activation time.
    pub fn empty() -> Self {
        Self::new(Level::Info, "", "")
    }

    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Write-outcome signal for one event submitted to the batch write path.
///
/// When a bulk insert fails, the target fails every submitted event's
/// completion individually so the host can treat each event's delivery
/// outcome on its own. Successful batches are not signalled; silence means
/// the flush went through.
#[derive(Debug)]
pub struct Completion {
    sender: oneshot::Sender<Arc<RavenTargetError>>,
}

impl Completion {
    /// Creates a completion and the receiver the submitting side listens on.
    pub fn channel() -> (Self, oneshot::Receiver<Arc<RavenTargetError>>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Reports this event's delivery failure to the submitting side.
    pub fn fail(self, error: Arc<RavenTargetError>) {
        // The submitting side may have given up and dropped its receiver.
        let _ = self.sender.send(error);
    }
}

/// A log event plus its completion signal, as submitted in a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub event: LogEvent,
    pub completion: Completion,
}

impl BatchItem {
    pub fn new(event: LogEvent) -> (Self, oneshot::Receiver<Arc<RavenTargetError>>) {
        let (completion, receiver) = Completion::channel();
        (Self { event, completion }, receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn level_round_trips_through_strings() {
        assert_eq!(Level::Warn.to_string(), "Warn");
        assert_eq!(Level::from_str("Warn").unwrap(), Level::Warn);
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!(Level::from_str("fatal").unwrap(), Level::Fatal);
        assert_eq!(Level::from_str("INFO").unwrap(), Level::Info);
        assert!(Level::from_str("loud").is_err());
    }

    #[tokio::test]
    async fn failed_completion_reaches_the_receiver() {
        let (item, receiver) = BatchItem::new(LogEvent::empty());
        let error = Arc::new(RavenTargetError::MissingUrls);
        item.completion.fail(error);

        let received = receiver.await.unwrap();
        assert!(matches!(*received, RavenTargetError::MissingUrls));
    }

    #[test]
    fn empty_event_has_no_content() {
        let event = LogEvent::empty();
        assert!(event.message.is_empty());
        assert!(event.logger.is_empty());
        assert!(event.exception.is_none());
        assert!(event.properties.is_empty());
    }
}
