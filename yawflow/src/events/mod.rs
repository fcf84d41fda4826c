//! Progress observation for pipeline runs.
//!
//! The orchestrator emits one event per state transition (plus a neutral
//! "awaiting input" event) to an [`EventSink`]. A presentation layer plugs
//! its own sink in to render spinners and status messages.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};

/// Emitted for every pipeline state transition.
pub const PIPELINE_STATE_CHANGED: &str = crate::core::StateChange::EVENT_TYPE;

/// Emitted when a run cannot start because inputs are missing.
pub const PIPELINE_AWAITING_INPUT: &str = "pipeline.awaiting_input";

/// Emitted when the staging directory could not be prepared.
pub const PIPELINE_STORAGE_FAILED: &str = "pipeline.storage_failed";
