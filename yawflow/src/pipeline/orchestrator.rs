//! The pipeline orchestrator.

use super::invoker::StageInvoker;
use super::reconcile::{reconcile, validate_scenes, verify_artifact};
use crate::cancellation::CancellationToken;
use crate::config::YawConfig;
use crate::core::{
    ClipSet, FinalArtifact, MissingInput, PipelineInputs, PipelineState, RunIdentity, Scene,
    ScriptInput, StageName, StateChange, VisualClip, VoiceClip,
};
use crate::errors::{PipelineError, StageError};
use crate::events::{EventSink, NoOpEventSink, PIPELINE_AWAITING_INPUT, PIPELINE_STORAGE_FAILED};
use crate::stages::Engines;
use crate::staging::{StagingArea, StagingDir};
use futures::future;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, Instrument};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run could not start; the caller should keep collecting input.
    AwaitingInput(MissingInput),
    /// Every stage succeeded.
    Done(FinalArtifact),
}

impl RunOutcome {
    /// Returns the artifact of a finished run.
    #[must_use]
    pub fn artifact(&self) -> Option<&FinalArtifact> {
        match self {
            Self::Done(artifact) => Some(artifact),
            Self::AwaitingInput(_) => None,
        }
    }
}

/// Sequences Parse, Voice/Visual and Assemble over the stage invoker.
///
/// The orchestrator halts on the first failure and never retries. In
/// concurrent mode the first synthesizer to fail ends the run and its
/// sibling is dropped mid-flight; in sequential mode voice runs to
/// completion before visual starts. Given the same engine behaviour, the
/// same inputs always yield the same stage sequence and outcome.
pub struct PipelineOrchestrator {
    staging: StagingArea,
    engines: Engines,
    invoker: StageInvoker,
    sink: Arc<dyn EventSink>,
    concurrent_synthesis: bool,
    state: RwLock<PipelineState>,
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("staging", &self.staging)
            .field("invoker", &self.invoker)
            .field("concurrent_synthesis", &self.concurrent_synthesis)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl PipelineOrchestrator {
    /// Creates an orchestrator with concurrent synthesis, no stage timeout
    /// and no event sink.
    #[must_use]
    pub fn new(staging: StagingArea, engines: Engines) -> Self {
        Self {
            staging,
            engines,
            invoker: StageInvoker::new(),
            sink: Arc::new(NoOpEventSink),
            concurrent_synthesis: true,
            state: RwLock::new(PipelineState::Idle),
        }
    }

    /// Creates an orchestrator from configuration.
    #[must_use]
    pub fn from_config(config: &YawConfig, engines: Engines) -> Self {
        let mut orchestrator = Self::new(config.staging_area(), engines)
            .with_concurrent_synthesis(config.concurrent_synthesis);
        if let Some(timeout) = config.stage_timeout() {
            orchestrator = orchestrator.with_stage_timeout(timeout);
        }
        orchestrator
    }

    /// Sets the sink that observes state transitions.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Limits how long each stage may run.
    #[must_use]
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.invoker = self.invoker.with_timeout(timeout);
        self
    }

    /// Chooses whether voice and visual synthesis run concurrently.
    #[must_use]
    pub fn with_concurrent_synthesis(mut self, concurrent: bool) -> Self {
        self.concurrent_synthesis = concurrent;
        self
    }

    /// Returns the staging area.
    #[must_use]
    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Returns the state reached by the latest run.
    #[must_use]
    pub fn state(&self) -> PipelineState {
        *self.state.read()
    }

    /// Runs the whole pipeline.
    pub async fn run(&self, inputs: &PipelineInputs) -> Result<RunOutcome, PipelineError> {
        self.run_with_cancellation(inputs, &CancellationToken::new()).await
    }

    /// Runs the pipeline, giving up once `deadline` has passed.
    ///
    /// Hitting the deadline fails the stage in flight exactly as if its
    /// engine had failed.
    pub async fn run_with_deadline(
        &self,
        inputs: &PipelineInputs,
        deadline: Duration,
    ) -> Result<RunOutcome, PipelineError> {
        let token = CancellationToken::new();
        let run = self.run_with_cancellation(inputs, &token);
        tokio::pin!(run);

        tokio::select! {
            outcome = &mut run => return outcome,
            () = tokio::time::sleep(deadline) => {
                token.cancel(format!("deadline of {}ms exceeded", deadline.as_millis()));
            }
        }
        run.await
    }

    /// Runs the pipeline under an externally controlled cancellation token.
    pub async fn run_with_cancellation(
        &self,
        inputs: &PipelineInputs,
        token: &CancellationToken,
    ) -> Result<RunOutcome, PipelineError> {
        let run = RunIdentity::new();
        let span = info_span!("pipeline_run", run_id = %run.run_id);
        self.execute(&run, inputs, token).instrument(span).await
    }

    async fn execute(
        &self,
        run: &RunIdentity,
        inputs: &PipelineInputs,
        token: &CancellationToken,
    ) -> Result<RunOutcome, PipelineError> {
        *self.state.write() = PipelineState::Idle;

        let script = match (inputs.missing(), &inputs.script) {
            (None, Some(script)) => script,
            (missing, _) => {
                let missing = missing.unwrap_or(MissingInput::Script);
                return Ok(self.await_input(run, missing));
            }
        };

        let staging = match self.staging.ensure() {
            Ok(dir) => dir,
            Err(err) => {
                error!(error = %err, "Staging directory unusable");
                self.sink.try_emit(
                    PIPELINE_STORAGE_FAILED,
                    Some(serde_json::json!({
                        "run_id": run.run_id.to_string(),
                        "error": err.to_string(),
                    })),
                );
                return Err(err.into());
            }
        };

        info!(
            script = %script.name,
            images = inputs.images.len(),
            staging = %staging.root().display(),
            "Pipeline started"
        );

        match self.drive(run, script, inputs, &staging, token).await {
            Ok(artifact) => {
                info!(
                    path = %artifact.path.display(),
                    size_bytes = artifact.size_bytes,
                    elapsed_ms = run.elapsed_ms(),
                    "Pipeline finished"
                );
                Ok(RunOutcome::Done(artifact))
            }
            Err(err) => {
                error!(stage = %err.stage, cause = %err.cause, "Pipeline failed");
                self.transition(run, PipelineState::Failed(err.stage), Some(&err.cause));
                Err(err.into())
            }
        }
    }

    async fn drive(
        &self,
        run: &RunIdentity,
        script: &ScriptInput,
        inputs: &PipelineInputs,
        staging: &StagingDir,
        token: &CancellationToken,
    ) -> Result<FinalArtifact, StageError> {
        self.transition(run, PipelineState::Parsing, None);
        let scenes = self.parse(script, token).await?;

        self.transition(run, PipelineState::Synthesizing, None);
        let (voices, visuals) = self.synthesize(&scenes, inputs, staging, token).await?;

        self.transition(run, PipelineState::Assembling, None);
        let artifact = self
            .invoker
            .invoke(
                StageName::Assemble,
                token,
                self.engines
                    .assembler
                    .assemble_movie(&scenes, &voices, &visuals, staging),
            )
            .await
            .map_err(|err| note_partial_artifacts(err, &scenes, staging))?;
        let artifact = verify_artifact(artifact)?;

        self.transition(run, PipelineState::Done, None);
        Ok(artifact)
    }

    async fn parse(
        &self,
        script: &ScriptInput,
        token: &CancellationToken,
    ) -> Result<Vec<Scene>, StageError> {
        let scenes = self
            .invoker
            .invoke(StageName::Parse, token, self.engines.parser.parse_script(script))
            .await?;
        let scenes = validate_scenes(scenes)?;
        info!(scenes = scenes.len(), "Script parsed");
        Ok(scenes)
    }

    async fn synthesize(
        &self,
        scenes: &[Scene],
        inputs: &PipelineInputs,
        staging: &StagingDir,
        token: &CancellationToken,
    ) -> Result<(ClipSet<VoiceClip>, ClipSet<VisualClip>), StageError> {
        let voices = async {
            let clips = self
                .invoker
                .invoke(
                    StageName::Voice,
                    token,
                    self.engines.voices.synthesize_voices(scenes, staging),
                )
                .await
                .map_err(|err| note_partial_artifacts(err, scenes, staging))?;
            reconcile(StageName::Voice, scenes, clips)
        };
        let visuals = async {
            let clips = self
                .invoker
                .invoke(
                    StageName::Visual,
                    token,
                    self.engines
                        .visuals
                        .synthesize_visuals(scenes, &inputs.images, staging),
                )
                .await
                .map_err(|err| note_partial_artifacts(err, scenes, staging))?;
            reconcile(StageName::Visual, scenes, clips)
        };

        if self.concurrent_synthesis {
            // The first branch to fail drops its sibling. Voice is polled
            // first, so it wins when both fail within the same poll.
            future::try_join(voices, visuals).await
        } else {
            let voices = voices.await?;
            let visuals = visuals.await?;
            Ok((voices, visuals))
        }
    }

    fn await_input(&self, run: &RunIdentity, missing: MissingInput) -> RunOutcome {
        info!(%missing, "Pipeline awaiting input");
        self.sink.try_emit(
            PIPELINE_AWAITING_INPUT,
            Some(serde_json::json!({
                "run_id": run.run_id.to_string(),
                "missing": missing,
                "message": missing.to_string(),
            })),
        );
        RunOutcome::AwaitingInput(missing)
    }

    fn transition(&self, run: &RunIdentity, to: PipelineState, cause: Option<&str>) {
        let from = {
            let mut state = self.state.write();
            let from = *state;
            debug_assert!(
                from.can_transition_to(to),
                "illegal pipeline transition {from} -> {to}"
            );
            *state = to;
            from
        };

        info!(%from, %to, "Pipeline state changed");
        let mut event = StateChange::new(run, from, to);
        if let Some(cause) = cause {
            event = event.with_cause(cause);
        }
        self.sink
            .try_emit(StateChange::EVENT_TYPE, Some(event.to_payload()));
    }
}

/// Flags `err` when the failed stage left files in its staging namespace.
fn note_partial_artifacts(err: StageError, scenes: &[Scene], staging: &StagingDir) -> StageError {
    if err.partial_artifacts {
        return err;
    }
    let left_behind = match err.stage {
        StageName::Parse => false,
        StageName::Voice => scenes
            .iter()
            .any(|scene| staging.voice_clip_path(scene.index).exists()),
        StageName::Visual => scenes
            .iter()
            .any(|scene| staging.visual_clip_path(scene.index).exists()),
        StageName::Assemble => staging.final_artifact_path().exists(),
    };
    if left_behind {
        err.with_partial_artifacts()
    } else {
        err
    }
}
