//! User-supplied pipeline inputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Recognised script upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptFormat {
    /// Plain text.
    Text,
    /// Word document.
    Docx,
    /// PDF document.
    Pdf,
    /// Anything else; left to the parser to accept or reject.
    Other,
}

/// Recognised character image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    /// JPEG image.
    Jpeg,
    /// PNG image.
    Png,
    /// Anything else; left to the visual engine to accept or reject.
    Other,
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// An uploaded script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInput {
    /// Original file name.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ScriptInput {
    /// Creates a script input from raw bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Creates a script input from text.
    #[must_use]
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, text.into().into_bytes())
    }

    /// Reads a script from disk, keeping its file name.
    pub fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self { name, bytes })
    }

    /// Detects the upload format from the file extension.
    #[must_use]
    pub fn format(&self) -> ScriptFormat {
        match extension_of(&self.name).as_deref() {
            Some("txt") => ScriptFormat::Text,
            Some("docx") => ScriptFormat::Docx,
            Some("pdf") => ScriptFormat::Pdf,
            _ => ScriptFormat::Other,
        }
    }

    /// Returns the contents as UTF-8 text, if they are valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// An uploaded character photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterImage {
    /// Original file name.
    pub name: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl CharacterImage {
    /// Creates a character image from raw bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Detects the image format from the file extension.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        match extension_of(&self.name).as_deref() {
            Some("jpg" | "jpeg") => ImageFormat::Jpeg,
            Some("png") => ImageFormat::Png,
            _ => ImageFormat::Other,
        }
    }
}

/// Which inputs are still missing before a run can start.
///
/// This is a wait state, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingInput {
    /// No script has been supplied.
    Script,
    /// No character images have been supplied.
    Images,
    /// Neither a script nor images have been supplied.
    ScriptAndImages,
}

impl fmt::Display for MissingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script => write!(f, "waiting for input: upload a script to begin"),
            Self::Images => write!(f, "waiting for input: upload character photos to begin"),
            Self::ScriptAndImages => {
                write!(f, "waiting for input: upload a script and character photos to begin")
            }
        }
    }
}

/// Everything a pipeline run consumes.
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    /// The script, once uploaded.
    pub script: Option<ScriptInput>,
    /// Character photos uploaded so far.
    pub images: Vec<CharacterImage>,
}

impl PipelineInputs {
    /// Creates an empty set of inputs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the script.
    #[must_use]
    pub fn with_script(mut self, script: ScriptInput) -> Self {
        self.script = Some(script);
        self
    }

    /// Adds a character image.
    #[must_use]
    pub fn with_image(mut self, image: CharacterImage) -> Self {
        self.images.push(image);
        self
    }

    /// Returns which inputs are missing, or `None` if the run can start.
    #[must_use]
    pub fn missing(&self) -> Option<MissingInput> {
        match (self.script.is_some(), !self.images.is_empty()) {
            (true, true) => None,
            (false, true) => Some(MissingInput::Script),
            (true, false) => Some(MissingInput::Images),
            (false, false) => Some(MissingInput::ScriptAndImages),
        }
    }
}
