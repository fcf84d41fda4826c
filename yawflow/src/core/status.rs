//! Stage names and pipeline states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    /// Script decomposition into scenes.
    Parse,
    /// Per-scene voice synthesis.
    Voice,
    /// Per-scene visual synthesis.
    Visual,
    /// Final movie assembly.
    Assemble,
}

impl StageName {
    /// All stages in pipeline order.
    pub const ALL: [Self; 4] = [Self::Parse, Self::Voice, Self::Visual, Self::Assemble];

    /// Returns the stage name as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Voice => "voice",
            Self::Visual => "visual",
            Self::Assemble => "assemble",
        }
    }

    /// Returns the pipeline state in which this stage runs.
    #[must_use]
    pub const fn active_state(&self) -> PipelineState {
        match self {
            Self::Parse => PipelineState::Parsing,
            Self::Voice | Self::Visual => PipelineState::Synthesizing,
            Self::Assemble => PipelineState::Assembling,
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The state of one pipeline run.
///
/// ```text
/// Idle -> Parsing -> Synthesizing -> Assembling -> Done
///            \            \              \
///             +------------+--------------+--> Failed(stage)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    /// Nothing has started yet.
    Idle,
    /// The script is being decomposed into scenes.
    Parsing,
    /// Voice and visual clips are being synthesized.
    Synthesizing,
    /// The movie is being assembled.
    Assembling,
    /// The movie is finished.
    Done,
    /// The named stage failed; the run is over.
    Failed(StageName),
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::Idle
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Parsing => write!(f, "parsing"),
            Self::Synthesizing => write!(f, "synthesizing"),
            Self::Assembling => write!(f, "assembling"),
            Self::Done => write!(f, "done"),
            Self::Failed(stage) => write!(f, "failed({stage})"),
        }
    }
}

impl PipelineState {
    /// Returns true if the state is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }

    /// Returns true if a stage is currently running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Parsing | Self::Synthesizing | Self::Assembling)
    }

    /// Returns true if moving from `self` to `next` is a legal transition.
    ///
    /// A failure is only legal for a stage that runs in the current state.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        match (self, next) {
            (Self::Idle, Self::Parsing)
            | (Self::Parsing, Self::Synthesizing)
            | (Self::Synthesizing, Self::Assembling)
            | (Self::Assembling, Self::Done) => true,
            (current, Self::Failed(stage)) => stage.active_state() == *current,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_name_display() {
        assert_eq!(StageName::Parse.to_string(), "parse");
        assert_eq!(StageName::Voice.to_string(), "voice");
        assert_eq!(StageName::Visual.to_string(), "visual");
        assert_eq!(StageName::Assemble.to_string(), "assemble");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PipelineState::Idle.to_string(), "idle");
        assert_eq!(PipelineState::Synthesizing.to_string(), "synthesizing");
        assert_eq!(PipelineState::Failed(StageName::Voice).to_string(), "failed(voice)");
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(PipelineState::Idle.can_transition_to(PipelineState::Parsing));
        assert!(PipelineState::Parsing.can_transition_to(PipelineState::Synthesizing));
        assert!(PipelineState::Synthesizing.can_transition_to(PipelineState::Assembling));
        assert!(PipelineState::Assembling.can_transition_to(PipelineState::Done));
    }

    #[test]
    fn test_failure_transitions() {
        assert!(PipelineState::Parsing.can_transition_to(PipelineState::Failed(StageName::Parse)));
        assert!(PipelineState::Synthesizing.can_transition_to(PipelineState::Failed(StageName::Voice)));
        assert!(PipelineState::Synthesizing.can_transition_to(PipelineState::Failed(StageName::Visual)));
        assert!(PipelineState::Assembling.can_transition_to(PipelineState::Failed(StageName::Assemble)));

        assert!(!PipelineState::Idle.can_transition_to(PipelineState::Failed(StageName::Parse)));
        assert!(!PipelineState::Parsing.can_transition_to(PipelineState::Failed(StageName::Voice)));
        assert!(!PipelineState::Done.can_transition_to(PipelineState::Failed(StageName::Assemble)));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!PipelineState::Idle.can_transition_to(PipelineState::Assembling));
        assert!(!PipelineState::Parsing.can_transition_to(PipelineState::Done));
        assert!(!PipelineState::Done.can_transition_to(PipelineState::Parsing));
    }

    #[test]
    fn test_state_terminal() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Failed(StageName::Parse).is_terminal());
        assert!(!PipelineState::Idle.is_terminal());
        assert!(PipelineState::Assembling.is_active());
        assert!(!PipelineState::Idle.is_active());
    }

    #[test]
    fn test_state_serialize() {
        let json = serde_json::to_value(PipelineState::Failed(StageName::Visual)).unwrap();
        assert_eq!(json, serde_json::json!({"state": "failed", "stage": "visual"}));

        let json = serde_json::to_value(PipelineState::Parsing).unwrap();
        assert_eq!(json, serde_json::json!({"state": "parsing"}));
    }
}
