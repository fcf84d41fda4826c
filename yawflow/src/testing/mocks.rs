//! Scripted engines for testing.
//!
//! Unlike pure mocks these engines write real files into the staging area,
//! so tests can assert on what is left on disk after a failure.

use anyhow::bail;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::fixtures::sample_scenes;
use crate::core::{
    CharacterImage, ClipSet, FinalArtifact, Scene, ScriptInput, VisualClip, VoiceClip,
};
use crate::stages::{Engines, MovieAssembler, ScriptParser, VisualSynthesizer, VoiceSynthesizer};
use crate::staging::StagingDir;

/// A parser that returns a fixed result.
#[derive(Debug)]
pub struct ScriptedParser {
    outcome: Result<Vec<Scene>, String>,
    calls: AtomicUsize,
}

impl ScriptedParser {
    /// Returns `scenes` on every call.
    #[must_use]
    pub fn returning(scenes: Vec<Scene>) -> Self {
        Self {
            outcome: Ok(scenes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails with `message` on every call.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScriptParser for ScriptedParser {
    async fn parse_script(&self, _script: &ScriptInput) -> anyhow::Result<Vec<Scene>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(scenes) => Ok(scenes.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

/// A voice engine that writes one `.wav` file per scene.
#[derive(Debug, Default)]
pub struct ScriptedVoices {
    fail_at: Option<usize>,
    clips_override: Option<Vec<VoiceClip>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedVoices {
    /// Creates a voice engine that succeeds for every scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails when reaching `scene_index`, after writing earlier scenes.
    #[must_use]
    pub fn failing_at(mut self, scene_index: usize) -> Self {
        self.fail_at = Some(scene_index);
        self
    }

    /// Returns these clips instead of the ones it writes.
    #[must_use]
    pub fn with_clips(mut self, clips: Vec<VoiceClip>) -> Self {
        self.clips_override = Some(clips);
        self
    }

    /// Sleeps before synthesizing.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoiceSynthesizer for ScriptedVoices {
    async fn synthesize_voices(
        &self,
        scenes: &[Scene],
        staging: &StagingDir,
    ) -> anyhow::Result<Vec<VoiceClip>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut clips = Vec::with_capacity(scenes.len());
        for scene in scenes {
            if self.fail_at == Some(scene.index) {
                bail!("voice synthesis failed for scene {}", scene.index);
            }
            let path = staging.voice_clip_path(scene.index);
            std::fs::write(&path, scene.text.as_bytes())?;
            clips.push(VoiceClip::new(scene.index, path, Duration::from_secs(2)));
        }

        Ok(self.clips_override.clone().unwrap_or(clips))
    }
}

/// A visual engine that writes one `.png` file per scene.
#[derive(Debug, Default)]
pub struct ScriptedVisuals {
    fail_at: Option<usize>,
    clips_override: Option<Vec<VisualClip>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    images_seen: AtomicUsize,
}

impl ScriptedVisuals {
    /// Creates a visual engine that succeeds for every scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails when reaching `scene_index`, after writing earlier scenes.
    #[must_use]
    pub fn failing_at(mut self, scene_index: usize) -> Self {
        self.fail_at = Some(scene_index);
        self
    }

    /// Returns these clips instead of the ones it writes.
    #[must_use]
    pub fn with_clips(mut self, clips: Vec<VisualClip>) -> Self {
        self.clips_override = Some(clips);
        self
    }

    /// Sleeps before rendering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of character images received by the last call.
    #[must_use]
    pub fn images_seen(&self) -> usize {
        self.images_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisualSynthesizer for ScriptedVisuals {
    async fn synthesize_visuals(
        &self,
        scenes: &[Scene],
        images: &[CharacterImage],
        staging: &StagingDir,
    ) -> anyhow::Result<Vec<VisualClip>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.images_seen.store(images.len(), Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut clips = Vec::with_capacity(scenes.len());
        for scene in scenes {
            if self.fail_at == Some(scene.index) {
                bail!("visual synthesis failed for scene {}", scene.index);
            }
            let path = staging.visual_clip_path(scene.index);
            std::fs::write(&path, [0x89, b'P', b'N', b'G'])?;
            clips.push(VisualClip::still(scene.index, path));
        }

        Ok(self.clips_override.clone().unwrap_or(clips))
    }
}

#[derive(Debug, Clone)]
enum AssemblyMode {
    Write,
    WriteEmpty,
    SkipWrite,
    Fail(String),
}

/// An assembler that writes a small placeholder movie.
#[derive(Debug)]
pub struct ScriptedAssembler {
    mode: AssemblyMode,
    calls: AtomicUsize,
    received: Mutex<Vec<(Vec<usize>, Vec<usize>)>>,
}

impl Default for ScriptedAssembler {
    fn default() -> Self {
        Self::with_mode(AssemblyMode::Write)
    }
}

impl ScriptedAssembler {
    fn with_mode(mode: AssemblyMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Creates an assembler that writes a non-empty movie file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an assembler that writes an empty movie file.
    #[must_use]
    pub fn writing_empty() -> Self {
        Self::with_mode(AssemblyMode::WriteEmpty)
    }

    /// Creates an assembler that reports success without writing anything.
    #[must_use]
    pub fn skipping_write() -> Self {
        Self::with_mode(AssemblyMode::SkipWrite)
    }

    /// Creates an assembler that always fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_mode(AssemblyMode::Fail(message.into()))
    }

    /// Number of calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Voice and visual index sets received by each call.
    #[must_use]
    pub fn received_indices(&self) -> Vec<(Vec<usize>, Vec<usize>)> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl MovieAssembler for ScriptedAssembler {
    async fn assemble_movie(
        &self,
        scenes: &[Scene],
        voices: &ClipSet<VoiceClip>,
        visuals: &ClipSet<VisualClip>,
        staging: &StagingDir,
    ) -> anyhow::Result<FinalArtifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().push((voices.indices(), visuals.indices()));

        let path = staging.final_artifact_path();
        match &self.mode {
            AssemblyMode::Fail(message) => bail!("{message}"),
            AssemblyMode::SkipWrite => {}
            AssemblyMode::WriteEmpty => std::fs::write(&path, b"")?,
            AssemblyMode::Write => {
                let mut body = format!("yawflow movie: {} scenes\n", scenes.len());
                for (index, voice) in voices {
                    body.push_str(&format!("{index}: {}\n", voice.path.display()));
                }
                std::fs::write(&path, body)?;
            }
        }

        Ok(FinalArtifact::mp4(path))
    }
}

/// A full set of scripted engines with handles kept for assertions.
#[derive(Debug, Clone)]
pub struct ScriptedEngines {
    /// Parse engine.
    pub parser: Arc<ScriptedParser>,
    /// Voice engine.
    pub voices: Arc<ScriptedVoices>,
    /// Visual engine.
    pub visuals: Arc<ScriptedVisuals>,
    /// Assemble engine.
    pub assembler: Arc<ScriptedAssembler>,
}

impl ScriptedEngines {
    /// Engines that succeed for a script of `scene_count` scenes.
    #[must_use]
    pub fn new(scene_count: usize) -> Self {
        Self {
            parser: Arc::new(ScriptedParser::returning(sample_scenes(scene_count))),
            voices: Arc::new(ScriptedVoices::new()),
            visuals: Arc::new(ScriptedVisuals::new()),
            assembler: Arc::new(ScriptedAssembler::new()),
        }
    }

    /// Replaces the parser.
    #[must_use]
    pub fn with_parser(mut self, parser: ScriptedParser) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Replaces the voice engine.
    #[must_use]
    pub fn with_voices(mut self, voices: ScriptedVoices) -> Self {
        self.voices = Arc::new(voices);
        self
    }

    /// Replaces the visual engine.
    #[must_use]
    pub fn with_visuals(mut self, visuals: ScriptedVisuals) -> Self {
        self.visuals = Arc::new(visuals);
        self
    }

    /// Replaces the assembler.
    #[must_use]
    pub fn with_assembler(mut self, assembler: ScriptedAssembler) -> Self {
        self.assembler = Arc::new(assembler);
        self
    }

    /// Bundles the engines for an orchestrator.
    #[must_use]
    pub fn engines(&self) -> Engines {
        Engines::new(
            self.parser.clone(),
            self.voices.clone(),
            self.visuals.clone(),
            self.assembler.clone(),
        )
    }
}
