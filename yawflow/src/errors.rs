//! Error types for the yawflow pipeline.
//!
//! Every failure the orchestrator can report falls into one of four kinds:
//! a stage failed, the staging directory is unusable, the final artifact
//! could not be read for delivery, or the configuration could not be
//! loaded. Missing user input is not an error at all; see
//! [`crate::core::MissingInput`].

use crate::core::StageName;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// The umbrella error returned by pipeline runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A pipeline stage failed.
    #[error("{0}")]
    Stage(#[from] StageError),

    /// The staging directory could not be prepared.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// The final artifact could not be packaged.
    #[error("{0}")]
    Delivery(#[from] DeliveryError),

    /// The blocking runtime could not be started.
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

impl PipelineError {
    /// Returns the stage that failed, if this is a stage failure.
    #[must_use]
    pub fn failed_stage(&self) -> Option<StageName> {
        match self {
            Self::Stage(err) => Some(err.stage),
            _ => None,
        }
    }

    /// Returns the stage error, if this is a stage failure.
    #[must_use]
    pub fn as_stage_error(&self) -> Option<&StageError> {
        match self {
            Self::Stage(err) => Some(err),
            _ => None,
        }
    }
}

/// A tagged failure of one pipeline stage.
///
/// Produced at the invoker boundary for anything an engine raises, and by
/// the orchestrator for contract violations (empty scene lists, clip index
/// mismatches, missing artifacts). Collaborator error types never cross
/// this boundary; only their rendered diagnostic survives in `cause`.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("Stage '{stage}' failed: {cause}")]
pub struct StageError {
    /// The stage that failed.
    pub stage: StageName,
    /// Diagnostic text describing the failure.
    pub cause: String,
    /// Whether the stage produced artifacts before failing.
    ///
    /// Such artifacts are always discarded by the pipeline, but are left
    /// in the staging area.
    #[serde(default)]
    pub partial_artifacts: bool,
}

impl StageError {
    /// Creates a new stage error.
    #[must_use]
    pub fn new(stage: StageName, cause: impl Into<String>) -> Self {
        Self {
            stage,
            cause: cause.into(),
            partial_artifacts: false,
        }
    }

    /// Marks the error as having left partial artifacts behind.
    #[must_use]
    pub fn with_partial_artifacts(mut self) -> Self {
        self.partial_artifacts = true;
        self
    }

    /// Creates a cancellation error for a stage.
    #[must_use]
    pub fn cancelled(stage: StageName, reason: &str) -> Self {
        Self::new(stage, format!("cancelled: {reason}"))
    }
}

/// The staging directory is unusable.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The staging path exists but is not a directory.
    #[error("Staging path '{}' exists but is not a directory", path.display())]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The staging directory could not be created.
    #[error("Failed to create staging directory '{}': {source}", path.display())]
    Create {
        /// The directory being created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The staging directory exists but cannot be written to.
    #[error("Staging directory '{}' is not writable: {source}", path.display())]
    NotWritable {
        /// The directory being probed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The staging path could not be inspected.
    #[error("Staging path '{}' is inaccessible: {source}", path.display())]
    Inaccessible {
        /// The offending path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// The final artifact could not be read at encode time.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The artifact file does not exist.
    #[error("Artifact '{}' does not exist", path.display())]
    Missing {
        /// The artifact path.
        path: PathBuf,
    },

    /// The artifact file exists but could not be read.
    #[error("Failed to read artifact '{}': {source}", path.display())]
    Unreadable {
        /// The artifact path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DeliveryError {
    pub(crate) fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::Missing { path }
        } else {
            Self::Unreadable { path, source }
        }
    }
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config '{}': {source}", path.display())]
    Read {
        /// The config path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for [`crate::config::YawConfig`].
    #[error("Failed to parse config '{}': {source}", path.display())]
    Parse {
        /// The config path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}
