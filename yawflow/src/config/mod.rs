//! Application configuration.
//!
//! Read from a JSON file (conventionally `production.json`). Every field has
//! a default, and a missing or broken file can fall back to the defaults
//! with a warning instead of refusing to start.

use crate::errors::ConfigError;
use crate::staging::{StagingArea, DEFAULT_OUTPUT_FILENAME, DEFAULT_STAGING_DIR};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Conventional config file name.
pub const DEFAULT_CONFIG_FILE: &str = "production.json";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YawConfig {
    /// Title shown by the presentation layer.
    #[serde(default = "default_app_title")]
    pub app_title: String,
    /// One-line description shown by the presentation layer.
    #[serde(default = "default_description")]
    pub description: String,
    /// Staging directory for intermediate and final artifacts.
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// File name of the assembled movie, also offered for download.
    #[serde(default = "default_output_filename")]
    pub output_filename: String,
    /// Per-stage timeout in seconds; unset means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_timeout_secs: Option<u64>,
    /// Whether voice and visual synthesis run concurrently.
    #[serde(default = "default_concurrent_synthesis")]
    pub concurrent_synthesis: bool,
}

fn default_app_title() -> String {
    "#yaw".to_string()
}

fn default_description() -> String {
    "AI-powered movie creation from scripts and images.".to_string()
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STAGING_DIR)
}

fn default_output_filename() -> String {
    DEFAULT_OUTPUT_FILENAME.to_string()
}

fn default_concurrent_synthesis() -> bool {
    true
}

impl Default for YawConfig {
    fn default() -> Self {
        Self {
            app_title: default_app_title(),
            description: default_description(),
            staging_dir: default_staging_dir(),
            output_filename: default_output_filename(),
            stage_timeout_secs: None,
            concurrent_synthesis: default_concurrent_synthesis(),
        }
    }
}

impl YawConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads configuration, falling back to defaults on any error.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|err| {
            warn!(error = %err, "Using default config");
            Self::default()
        })
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Sets the staging directory.
    #[must_use]
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Sets the per-stage timeout.
    #[must_use]
    pub fn with_stage_timeout_secs(mut self, secs: u64) -> Self {
        self.stage_timeout_secs = Some(secs);
        self
    }

    /// Gets the per-stage timeout as a Duration.
    #[must_use]
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_secs.map(Duration::from_secs)
    }

    /// Builds the staging area described by this configuration.
    #[must_use]
    pub fn staging_area(&self) -> StagingArea {
        StagingArea::new(&self.staging_dir).with_output_filename(&self.output_filename)
    }
}
