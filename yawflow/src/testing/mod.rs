//! Testing utilities for yawflow pipelines.
//!
//! This module provides:
//! - Scripted engines that write real files into the staging area
//! - Input fixtures

mod fixtures;
mod mocks;

pub use fixtures::{sample_inputs, sample_scenes};
pub use mocks::{ScriptedAssembler, ScriptedEngines, ScriptedParser, ScriptedVisuals, ScriptedVoices};
