//! Generation engine interfaces.
//!
//! Each pipeline stage is backed by an external engine. The orchestrator
//! only knows these traits; what a parser, synthesizer or assembler does
//! internally is out of scope. Engines report failure with
//! [`anyhow::Error`], which the [`crate::pipeline::StageInvoker`] turns
//! into a tagged [`crate::errors::StageError`].

use crate::core::{CharacterImage, ClipSet, FinalArtifact, Scene, ScriptInput, VisualClip, VoiceClip};
use crate::staging::StagingDir;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Splits a script into an ordered scene sequence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScriptParser: Send + Sync {
    /// Parses the uploaded script. Fails on malformed or unreadable input.
    async fn parse_script(&self, script: &ScriptInput) -> anyhow::Result<Vec<Scene>>;
}

/// Produces one voice clip per scene.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    /// Synthesizes voices, writing clips under `staging`'s voice directory.
    async fn synthesize_voices(
        &self,
        scenes: &[Scene],
        staging: &StagingDir,
    ) -> anyhow::Result<Vec<VoiceClip>>;
}

/// Produces one visual clip per scene.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisualSynthesizer: Send + Sync {
    /// Renders visuals from the scenes and character images, writing clips
    /// under `staging`'s visual directory.
    async fn synthesize_visuals(
        &self,
        scenes: &[Scene],
        images: &[CharacterImage],
        staging: &StagingDir,
    ) -> anyhow::Result<Vec<VisualClip>>;
}

/// Stitches scenes and clips into the finished movie.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieAssembler: Send + Sync {
    /// Assembles the movie. Both clip sets cover exactly the scene indices.
    async fn assemble_movie(
        &self,
        scenes: &[Scene],
        voices: &ClipSet<VoiceClip>,
        visuals: &ClipSet<VisualClip>,
        staging: &StagingDir,
    ) -> anyhow::Result<FinalArtifact>;
}

/// The four engines a pipeline run needs.
#[derive(Clone)]
pub struct Engines {
    /// Parse stage engine.
    pub parser: Arc<dyn ScriptParser>,
    /// Voice stage engine.
    pub voices: Arc<dyn VoiceSynthesizer>,
    /// Visual stage engine.
    pub visuals: Arc<dyn VisualSynthesizer>,
    /// Assemble stage engine.
    pub assembler: Arc<dyn MovieAssembler>,
}

impl Engines {
    /// Bundles the four engines.
    pub fn new(
        parser: Arc<dyn ScriptParser>,
        voices: Arc<dyn VoiceSynthesizer>,
        visuals: Arc<dyn VisualSynthesizer>,
        assembler: Arc<dyn MovieAssembler>,
    ) -> Self {
        Self {
            parser,
            voices,
            visuals,
            assembler,
        }
    }
}

impl fmt::Debug for Engines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engines").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scene;
    use mockall::predicate::function;

    #[tokio::test]
    async fn test_mock_parser_is_object_safe() {
        let mut parser = MockScriptParser::new();
        parser
            .expect_parse_script()
            .with(function(|s: &ScriptInput| s.name == "pilot.txt"))
            .times(1)
            .returning(|_| Ok(vec![Scene::new(0, "Fade in.")]));

        let parser: Arc<dyn ScriptParser> = Arc::new(parser);
        let scenes = parser
            .parse_script(&ScriptInput::from_text("pilot.txt", "Fade in."))
            .await
            .unwrap();
        assert_eq!(scenes.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_voice_failure_is_anyhow() {
        let mut voices = MockVoiceSynthesizer::new();
        voices
            .expect_synthesize_voices()
            .returning(|_, _| Err(anyhow::anyhow!("no voice model loaded")));

        let tmp = tempfile::tempdir().unwrap();
        let staging = crate::staging::StagingArea::new(tmp.path()).ensure().unwrap();
        let err = voices.synthesize_voices(&[], &staging).await.unwrap_err();
        assert_eq!(err.to_string(), "no voice model loaded");
    }
}
