//! Core domain model types for yawflow.
//!
//! This module contains the fundamental types passed between stages:
//! - Stage names and pipeline states
//! - User inputs (script and character images)
//! - Scenes, per-scene clips and the final artifact
//! - Run identity and state-change events

mod artifact;
mod clip;
mod event;
mod identity;
mod inputs;
mod scene;
mod status;

pub use artifact::{ContainerFormat, FinalArtifact};
pub use clip::{ClipKind, ClipSet, SceneClip, VisualClip, VoiceClip};
pub use event::StateChange;
pub use identity::RunIdentity;
pub use inputs::{CharacterImage, ImageFormat, MissingInput, PipelineInputs, ScriptFormat, ScriptInput};
pub use scene::Scene;
pub use status::{PipelineState, StageName};
