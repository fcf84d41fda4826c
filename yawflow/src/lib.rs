//! # Yawflow
//!
//! Orchestration core for turning a written script and a set of character
//! images into a finished movie.
//!
//! The heavy lifting is done by four external generation engines:
//!
//! - **Parse**: splits the script into an ordered list of scenes
//! - **Voice**: synthesizes one voice clip per scene
//! - **Visual**: renders one visual clip per scene from the character images
//! - **Assemble**: stitches scenes, voices and visuals into the final movie
//!
//! This crate sequences those engines, reconciles their per-scene outputs,
//! isolates failures per stage, owns the on-disk staging area and packages
//! the finished movie for download.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use yawflow::prelude::*;
//!
//! let config = YawConfig::load_or_default("production.json");
//! let yaw = Yaw::from_config(&config, engines);
//!
//! let inputs = PipelineInputs::new()
//!     .with_script(ScriptInput::from_text("script.txt", script_text))
//!     .with_image(CharacterImage::new("hero.png", hero_bytes));
//!
//! match yaw.produce(&inputs).await? {
//!     Production::AwaitingInput(missing) => println!("{missing}"),
//!     Production::Ready { deliverable, .. } => save(deliverable),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod core;
pub mod delivery;
pub mod errors;
pub mod events;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod staging;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::YawConfig;
    pub use crate::core::{
        CharacterImage, ClipKind, ClipSet, ContainerFormat, FinalArtifact,
        MissingInput, PipelineInputs, PipelineState, RunIdentity, Scene,
        SceneClip, ScriptInput, StageName, VisualClip, VoiceClip,
    };
    pub use crate::delivery::{Deliverable, DeliveryEncoder};
    pub use crate::errors::{
        ConfigError, DeliveryError, PipelineError, StageError, StorageError,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent,
    };
    pub use crate::pipeline::{
        PipelineOrchestrator, Production, RunOutcome, StageInvoker, Yaw,
    };
    pub use crate::stages::{
        Engines, MovieAssembler, ScriptParser, VisualSynthesizer, VoiceSynthesizer,
    };
    pub use crate::staging::{StagingArea, StagingDir};
}
