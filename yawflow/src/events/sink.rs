//! Progress sinks.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn, Level};

use super::{PIPELINE_AWAITING_INPUT, PIPELINE_STATE_CHANGED, PIPELINE_STORAGE_FAILED};

/// Observer of pipeline progress.
///
/// The orchestrator calls [`EventSink::try_emit`] from inside a run, so
/// implementations must return quickly and must never panic. A slow
/// consumer should buffer and hand off instead of doing I/O inline.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers an event, possibly waiting on the consumer.
    async fn emit(&self, event_type: &str, data: Option<Value>);

    /// Delivers an event without waiting.
    fn try_emit(&self, event_type: &str, data: Option<Value>);
}

/// Discards everything. The orchestrator's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<Value>) {}

    fn try_emit(&self, _event_type: &str, _data: Option<Value>) {}
}

/// Writes progress to `tracing`.
///
/// State changes are logged with their `from`/`to` fields; transitions into
/// a failed state and storage failures are always logged at `warn`.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::info()
    }
}

impl LoggingEventSink {
    /// Logs routine progress at `level`.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Logs routine progress at `debug`.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Logs routine progress at `info`.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log(&self, event_type: &str, data: Option<&Value>) {
        let field = |key: &str| {
            data.and_then(|d| d.get(key))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        match event_type {
            PIPELINE_STATE_CHANGED if data.and_then(|d| d.get("stage")).is_some() => {
                warn!(from = %field("from"), to = %field("to"), cause = %field("cause"), "Pipeline state changed");
            }
            PIPELINE_STORAGE_FAILED => {
                warn!(error = %field("error"), "Staging directory unusable");
            }
            PIPELINE_STATE_CHANGED if self.level == Level::DEBUG => {
                debug!(from = %field("from"), to = %field("to"), "Pipeline state changed");
            }
            PIPELINE_STATE_CHANGED => {
                info!(from = %field("from"), to = %field("to"), "Pipeline state changed");
            }
            PIPELINE_AWAITING_INPUT => {
                info!(message = %field("message"), "Pipeline awaiting input");
            }
            _ if self.level == Level::DEBUG => debug!(event_type, event_data = ?data, "Pipeline event"),
            _ => info!(event_type, event_data = ?data, "Pipeline event"),
        }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.log(event_type, data.as_ref());
    }

    fn try_emit(&self, event_type: &str, data: Option<Value>) {
        self.log(event_type, data.as_ref());
    }
}

/// One event captured by [`CollectingEventSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Event type, e.g. `pipeline.state_changed`.
    pub event_type: String,
    /// Payload, if any.
    pub data: Option<Value>,
}

impl RecordedEvent {
    /// Returns a string field of the payload.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

/// Keeps every event in memory, for tests and progress replay.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<RecordedEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events so far, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().clone()
    }

    /// Number of events so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Forgets everything collected so far.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Events of exactly `event_type`.
    #[must_use]
    pub fn events_of_type(&self, event_type: &str) -> Vec<RecordedEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// The `to` state of every state change, in order.
    #[must_use]
    pub fn state_trail(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type == PIPELINE_STATE_CHANGED)
            .filter_map(|e| e.field("to").map(str::to_string))
            .collect()
    }

    fn record(&self, event_type: &str, data: Option<Value>) {
        self.events.write().push(RecordedEvent {
            event_type: event_type.to_string(),
            data,
        });
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.record(event_type, data);
    }

    fn try_emit(&self, event_type: &str, data: Option<Value>) {
        self.record(event_type, data);
    }
}
