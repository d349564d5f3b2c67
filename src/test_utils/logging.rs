//! Structured log capture for asserting on emitted events.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::Level;
use tracing_subscriber::prelude::*;

/// A captured log event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Events recorded by a [`TestLogLayer`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CapturedLogs {
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    #[must_use]
    pub fn contains_message(&self, message: &str) -> bool {
        self.entries.lock().iter().any(|e| e.message.contains(message))
    }

    #[must_use]
    pub fn filter_by_level(&self, level: Level) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    fn push(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }
}

/// Layer that records every event into a [`CapturedLogs`] buffer.
pub struct TestLogLayer {
    logs: CapturedLogs,
}

impl TestLogLayer {
    #[must_use]
    pub const fn new(logs: CapturedLogs) -> Self {
        Self { logs }
    }
}

impl<S> tracing_subscriber::Layer<S> for TestLogLayer
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        struct MessageVisitor<'a> {
            message: &'a mut String,
            fields: &'a mut Vec<(String, String)>,
        }

        impl tracing::field::Visit for MessageVisitor<'_> {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    *self.message = value.to_string();
                } else {
                    self.fields
                        .push((field.name().to_string(), value.to_string()));
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                let value = format!("{value:?}");
                if field.name() == "message" {
                    *self.message = value;
                } else {
                    self.fields.push((field.name().to_string(), value));
                }
            }
        }

        let metadata = event.metadata();
        let mut message = String::new();
        let mut fields = Vec::new();
        event.record(&mut MessageVisitor {
            message: &mut message,
            fields: &mut fields,
        });

        self.logs.push(LogEntry {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message,
            fields,
        });
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CapturedLogs) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry().with(TestLogLayer::new(logs.clone()));
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs)
}
