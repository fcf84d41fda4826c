//! State-change event emitted once per pipeline transition.

use super::{PipelineState, RunIdentity, StageName};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pipeline state transition, as seen by a progress observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// The run the transition belongs to.
    pub run_id: Uuid,
    /// State before the transition.
    pub from: PipelineState,
    /// State after the transition.
    pub to: PipelineState,
    /// Diagnostic cause, for transitions into `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// When the transition happened (ISO 8601).
    pub timestamp: String,
}

impl StateChange {
    /// Event type under which transitions are emitted.
    pub const EVENT_TYPE: &'static str = "pipeline.state_changed";

    /// Creates a new transition event.
    #[must_use]
    pub fn new(run: &RunIdentity, from: PipelineState, to: PipelineState) -> Self {
        Self {
            run_id: run.run_id,
            from,
            to,
            cause: None,
            timestamp: iso_timestamp(),
        }
    }

    /// Attaches a failure cause.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns the failed stage, if this transition is into `Failed`.
    #[must_use]
    pub fn failed_stage(&self) -> Option<StageName> {
        match self.to {
            PipelineState::Failed(stage) => Some(stage),
            _ => None,
        }
    }

    /// Converts the event into the payload handed to event sinks.
    #[must_use]
    pub fn to_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "run_id": self.run_id.to_string(),
            "from": self.from.to_string(),
            "to": self.to.to_string(),
            "timestamp": self.timestamp,
        });

        if let Some(stage) = self.failed_stage() {
            payload["stage"] = serde_json::json!(stage);
        }
        if let Some(ref cause) = self.cause {
            payload["cause"] = serde_json::json!(cause);
        }

        payload
    }
}

/// Current UTC time formatted as `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`.
fn iso_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_change_payload() {
        let run = RunIdentity::new();
        let event = StateChange::new(&run, PipelineState::Idle, PipelineState::Parsing);
        let payload = event.to_payload();

        assert_eq!(payload["from"], "idle");
        assert_eq!(payload["to"], "parsing");
        assert_eq!(payload["run_id"], run.run_id.to_string());
        assert!(payload.get("stage").is_none());
        assert!(payload.get("cause").is_none());
    }

    #[test]
    fn test_failure_payload() {
        let run = RunIdentity::new();
        let event = StateChange::new(
            &run,
            PipelineState::Synthesizing,
            PipelineState::Failed(StageName::Voice),
        )
        .with_cause("tts engine offline");

        assert_eq!(event.failed_stage(), Some(StageName::Voice));
        let payload = event.to_payload();
        assert_eq!(payload["stage"], "voice");
        assert_eq!(payload["cause"], "tts engine offline");
        assert_eq!(payload["to"], "failed(voice)");
    }

    #[test]
    fn test_timestamp_format() {
        let event = StateChange::new(&RunIdentity::new(), PipelineState::Idle, PipelineState::Parsing);
        assert!(event.timestamp.contains('T'));
        assert!(event.timestamp.ends_with("+00:00"));
    }
}
