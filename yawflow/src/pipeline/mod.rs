//! Pipeline orchestration.
//!
//! This module provides:
//! - The stage invoker boundary
//! - Structural checks between stages
//! - The orchestrator state machine
//! - The caller-facing [`Yaw`] facade

mod invoker;
mod orchestrator;
mod reconcile;
mod yaw;

pub use invoker::StageInvoker;
pub use orchestrator::{PipelineOrchestrator, RunOutcome};
pub use reconcile::{reconcile, validate_scenes, verify_artifact};
pub use yaw::{Production, Yaw};
