//! Packaging of the finished movie for handoff to a caller.

use crate::core::{ContainerFormat, FinalArtifact};
use crate::errors::DeliveryError;
use crate::staging::DEFAULT_OUTPUT_FILENAME;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// A self-contained, transferable copy of the finished movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    /// The full file contents.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// File name the caller should save the movie under.
    pub suggested_filename: String,
    /// MIME type of the contents.
    pub mime_type: String,
}

impl Deliverable {
    /// Size of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hex-encoded SHA-256 digest of the payload.
    #[must_use]
    pub fn sha256(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    /// The payload as a `data:` URI, suitable for a download link.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Reads a finished artifact into a [`Deliverable`].
///
/// Encoding is deterministic and read-only: the source file is never
/// modified or removed.
#[derive(Debug, Clone)]
pub struct DeliveryEncoder {
    suggested_filename: String,
    format: ContainerFormat,
}

impl Default for DeliveryEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_FILENAME)
    }
}

impl DeliveryEncoder {
    /// Creates an encoder that suggests `suggested_filename` for MP4 output.
    #[must_use]
    pub fn new(suggested_filename: impl Into<String>) -> Self {
        Self {
            suggested_filename: suggested_filename.into(),
            format: ContainerFormat::Mp4,
        }
    }

    /// Sets the container format, which determines the MIME type.
    #[must_use]
    pub fn with_format(mut self, format: ContainerFormat) -> Self {
        self.format = format;
        self
    }

    /// Encodes the file at `path`.
    ///
    /// The file may have vanished since the pipeline verified it; that is
    /// reported as [`DeliveryError::Missing`].
    pub fn encode(&self, path: impl AsRef<Path>) -> Result<Deliverable, DeliveryError> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).map_err(|source| DeliveryError::from_io(path.to_path_buf(), source))?;
        debug!(path = %path.display(), size_bytes = bytes.len(), "Artifact encoded");

        Ok(Deliverable {
            bytes,
            suggested_filename: self.suggested_filename.clone(),
            mime_type: self.format.mime_type().to_string(),
        })
    }

    /// Encodes a finished artifact, taking the MIME type from its format.
    pub fn encode_artifact(&self, artifact: &FinalArtifact) -> Result<Deliverable, DeliveryError> {
        self.clone().with_format(artifact.format).encode(&artifact.path)
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_file(contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("movie_output.mp4");
        std::fs::write(&path, contents).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_encode_reads_file() {
        let (_tmp, path) = artifact_file(b"\x00\x00\x00\x18ftypmp42");
        let deliverable = DeliveryEncoder::default().encode(&path).unwrap();

        assert_eq!(deliverable.bytes, b"\x00\x00\x00\x18ftypmp42");
        assert_eq!(deliverable.suggested_filename, "movie_output.mp4");
        assert_eq!(deliverable.mime_type, "video/mp4");
        assert_eq!(deliverable.len(), 12);
    }

    #[test]
    fn test_encode_is_idempotent_and_read_only() {
        let (_tmp, path) = artifact_file(b"frames");
        let encoder = DeliveryEncoder::new("pilot.mp4");

        let first = encoder.encode(&path).unwrap();
        let second = encoder.encode(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.sha256(), second.sha256());
        assert_eq!(std::fs::read(&path).unwrap(), b"frames");
    }

    #[test]
    fn test_encode_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = DeliveryEncoder::default()
            .encode(tmp.path().join("gone.mp4"))
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Missing { .. }));
    }

    #[test]
    fn test_encode_directory_is_unreadable() {
        let tmp = tempfile::tempdir().unwrap();
        let err = DeliveryEncoder::default().encode(tmp.path()).unwrap_err();
        assert!(matches!(err, DeliveryError::Unreadable { .. }));
    }

    #[test]
    fn test_encode_artifact_uses_format() {
        let (_tmp, path) = artifact_file(b"movie");
        let deliverable = DeliveryEncoder::default()
            .encode_artifact(&FinalArtifact::mp4(&path))
            .unwrap();
        assert_eq!(deliverable.mime_type, "video/mp4");
    }

    #[test]
    fn test_data_uri() {
        let deliverable = Deliverable {
            bytes: b"hi".to_vec(),
            suggested_filename: "movie_output.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
        };
        assert_eq!(deliverable.to_data_uri(), "data:video/mp4;base64,aGk=");
    }

    #[test]
    fn test_sha256_digest() {
        let deliverable = Deliverable {
            bytes: b"abc".to_vec(),
            suggested_filename: "x.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
        };
        assert_eq!(
            deliverable.sha256(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_deliverable_serializes_bytes_as_base64() {
        let deliverable = Deliverable {
            bytes: b"hi".to_vec(),
            suggested_filename: "movie_output.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
        };
        let json = serde_json::to_value(&deliverable).unwrap();
        assert_eq!(json["bytes"], "aGk=");
    }
}
