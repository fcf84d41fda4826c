//! On-disk scratch space for one pipeline run.
//!
//! The staging area is created on demand and never torn down by this
//! crate; cleanup belongs to the surrounding deployment. Stages write into
//! disjoint subdirectories so that concurrently running voice and visual
//! synthesis cannot collide:
//!
//! ```text
//! storage/
//! ├── voice/scene_0000.wav
//! ├── visual/scene_0000.png
//! └── final/movie_output.mp4
//! ```

use crate::core::ClipKind;
use crate::errors::StorageError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

const PROBE_FILE: &str = ".yawflow-probe";
const FINAL_DIR: &str = "final";

/// Default staging directory, relative to the working directory.
pub const DEFAULT_STAGING_DIR: &str = "storage";

/// Default file name of the assembled movie.
pub const DEFAULT_OUTPUT_FILENAME: &str = "movie_output.mp4";

/// Owner of the staging directory.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    output_filename: String,
}

impl Default for StagingArea {
    fn default() -> Self {
        Self::new(DEFAULT_STAGING_DIR)
    }
}

impl StagingArea {
    /// Creates a staging area rooted at `root`. Nothing touches the disk
    /// until [`StagingArea::ensure`] is called.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
        }
    }

    /// Sets the file name used for the assembled movie.
    ///
    /// Only a bare file name is accepted, so the movie always lands inside
    /// `final/`. Anything with a directory part is ignored with a warning
    /// and the previous name is kept.
    #[must_use]
    pub fn with_output_filename(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match bare_file_name(&name) {
            Some(bare) => self.output_filename = bare,
            None => warn!(
                name = %name,
                kept = %self.output_filename,
                "Output filename is not a bare file name"
            ),
        }
        self
    }

    /// Returns the staging root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Makes sure the staging directory exists and is writable.
    ///
    /// Idempotent: an existing, usable directory is left untouched apart
    /// from creating any missing stage subdirectories.
    pub fn ensure(&self) -> Result<StagingDir, StorageError> {
        match fs::metadata(&self.root) {
            Ok(meta) if !meta.is_dir() => {
                return Err(StorageError::NotADirectory {
                    path: self.root.clone(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.root.display(), "Creating staging directory");
                fs::create_dir_all(&self.root).map_err(|source| StorageError::Create {
                    path: self.root.clone(),
                    source,
                })?;
            }
            Err(source) => {
                return Err(StorageError::Inaccessible {
                    path: self.root.clone(),
                    source,
                });
            }
        }

        self.probe_writable()?;

        let dir = StagingDir {
            root: self.root.clone(),
            output_filename: self.output_filename.clone(),
        };
        for sub in [dir.clip_dir(ClipKind::Voice), dir.clip_dir(ClipKind::Visual), dir.final_dir()] {
            fs::create_dir_all(&sub).map_err(|source| StorageError::Create { path: sub, source })?;
        }

        Ok(dir)
    }

    fn probe_writable(&self) -> Result<(), StorageError> {
        let probe = self.root.join(PROBE_FILE);
        let not_writable = |source| StorageError::NotWritable {
            path: self.root.clone(),
            source,
        };
        fs::write(&probe, b"").map_err(not_writable)?;
        fs::remove_file(&probe).map_err(not_writable)
    }
}

/// Handle to a prepared staging directory.
///
/// Engines receive this handle to find where their artifacts belong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDir {
    root: PathBuf,
    output_filename: String,
}

impl StagingDir {
    /// Returns the staging root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding clips of one kind.
    #[must_use]
    pub fn clip_dir(&self, kind: ClipKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Path for a clip of `kind` belonging to `scene_index`.
    #[must_use]
    pub fn clip_path(&self, kind: ClipKind, scene_index: usize, extension: &str) -> PathBuf {
        self.clip_dir(kind)
            .join(format!("scene_{scene_index:04}.{extension}"))
    }

    /// Default voice clip path for a scene.
    #[must_use]
    pub fn voice_clip_path(&self, scene_index: usize) -> PathBuf {
        self.clip_path(ClipKind::Voice, scene_index, ClipKind::Voice.default_extension())
    }

    /// Default visual clip path for a scene.
    #[must_use]
    pub fn visual_clip_path(&self, scene_index: usize) -> PathBuf {
        self.clip_path(ClipKind::Visual, scene_index, ClipKind::Visual.default_extension())
    }

    /// Directory holding the assembled movie.
    #[must_use]
    pub fn final_dir(&self) -> PathBuf {
        self.root.join(FINAL_DIR)
    }

    /// Where the assembler should write the movie.
    #[must_use]
    pub fn final_artifact_path(&self) -> PathBuf {
        self.final_dir().join(&self.output_filename)
    }
}

fn bare_file_name(name: &str) -> Option<String> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(file)), None) => file.to_str().map(str::to_string),
        _ => None,
    }
}
