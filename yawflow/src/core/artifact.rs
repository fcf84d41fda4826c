//! Final artifact produced by the assemble stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The container format of the finished movie.
///
/// Only MP4 is produced today; the enum leaves room for the assembler to
/// grow other containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// MPEG-4 Part 14.
    #[default]
    Mp4,
}

impl ContainerFormat {
    /// MIME type for the container.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
        }
    }

    /// File extension for the container, without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// The assembled movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalArtifact {
    /// Location of the movie file.
    pub path: PathBuf,
    /// Container format of the file.
    #[serde(default)]
    pub format: ContainerFormat,
    /// File size in bytes, as measured after assembly.
    #[serde(default)]
    pub size_bytes: u64,
}

impl FinalArtifact {
    /// Creates a new MP4 artifact reference.
    ///
    /// The size is filled in by the orchestrator once it has verified the
    /// file on disk.
    #[must_use]
    pub fn mp4(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: ContainerFormat::Mp4,
            size_bytes: 0,
        }
    }

    /// Returns the MIME type of the artifact.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}
