//! Caller-facing entry point: run the pipeline and package the result.

use super::orchestrator::{PipelineOrchestrator, RunOutcome};
use crate::config::YawConfig;
use crate::core::{FinalArtifact, MissingInput, PipelineInputs};
use crate::delivery::{Deliverable, DeliveryEncoder};
use crate::errors::PipelineError;
use crate::events::EventSink;
use crate::stages::Engines;
use std::sync::Arc;

/// What the caller gets back from [`Yaw::produce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Production {
    /// Not enough input yet; show the message and wait.
    AwaitingInput(MissingInput),
    /// The movie is ready for download.
    Ready {
        /// The artifact in the staging area.
        artifact: FinalArtifact,
        /// The packaged movie.
        deliverable: Deliverable,
    },
}

impl Production {
    /// Returns the deliverable, if the movie is ready.
    #[must_use]
    pub fn deliverable(&self) -> Option<&Deliverable> {
        match self {
            Self::Ready { deliverable, .. } => Some(deliverable),
            Self::AwaitingInput(_) => None,
        }
    }
}

/// Orchestrator plus delivery encoder.
#[derive(Debug)]
pub struct Yaw {
    orchestrator: PipelineOrchestrator,
    encoder: DeliveryEncoder,
}

impl Yaw {
    /// Wires an orchestrator and an encoder together.
    #[must_use]
    pub fn new(orchestrator: PipelineOrchestrator, encoder: DeliveryEncoder) -> Self {
        Self {
            orchestrator,
            encoder,
        }
    }

    /// Builds everything from configuration.
    #[must_use]
    pub fn from_config(config: &YawConfig, engines: Engines) -> Self {
        Self::new(
            PipelineOrchestrator::from_config(config, engines),
            DeliveryEncoder::new(&config.output_filename),
        )
    }

    /// Sets the sink that observes pipeline progress.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.orchestrator = self.orchestrator.with_event_sink(sink);
        self
    }

    /// Returns the orchestrator.
    #[must_use]
    pub fn orchestrator(&self) -> &PipelineOrchestrator {
        &self.orchestrator
    }

    /// Runs the pipeline and packages the movie.
    pub async fn produce(&self, inputs: &PipelineInputs) -> Result<Production, PipelineError> {
        match self.orchestrator.run(inputs).await? {
            RunOutcome::AwaitingInput(missing) => Ok(Production::AwaitingInput(missing)),
            RunOutcome::Done(artifact) => {
                let deliverable = self.encoder.encode_artifact(&artifact)?;
                Ok(Production::Ready {
                    artifact,
                    deliverable,
                })
            }
        }
    }

    /// Blocking variant of [`Yaw::produce`] for callers without a runtime.
    ///
    /// Must not be called from inside an async context.
    pub fn produce_blocking(&self, inputs: &PipelineInputs) -> Result<Production, PipelineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.produce(inputs))
    }
}
