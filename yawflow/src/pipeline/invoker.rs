//! Uniform boundary around every engine call.

use crate::cancellation::CancellationToken;
use crate::core::StageName;
use crate::errors::StageError;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Calls one engine capability and converts any failure into a
/// [`StageError`] tagged with the stage name.
///
/// Covered failure kinds: an `Err` from the engine, a panic inside the
/// engine, the optional per-stage timeout, and external cancellation.
/// Files the engine already wrote stay where they are. On success the
/// output is returned untouched; structural checks are the orchestrator's
/// job.
#[derive(Debug, Clone, Default)]
pub struct StageInvoker {
    timeout: Option<Duration>,
}

enum Failure {
    Engine(String),
    Timeout(Duration),
    Cancelled(String),
}

impl StageInvoker {
    /// Creates an invoker without a per-stage timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how long a single stage may run.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the per-stage timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs `call` as `stage`.
    pub async fn invoke<T, F>(
        &self,
        stage: StageName,
        token: &CancellationToken,
        call: F,
    ) -> Result<T, StageError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        if token.is_cancelled() {
            return Err(StageError::cancelled(stage, &cancel_reason(token)));
        }

        debug!(stage = %stage, "Stage started");
        let start = Instant::now();

        let guarded = AssertUnwindSafe(call).catch_unwind();
        let bounded = async {
            let outcome = match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, guarded).await {
                    Ok(outcome) => outcome,
                    Err(_) => return Err(Failure::Timeout(limit)),
                },
                None => guarded.await,
            };
            match outcome {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(Failure::Engine(format!("{err:#}"))),
                Err(payload) => Err(Failure::Engine(format!(
                    "engine panicked: {}",
                    panic_message(payload.as_ref())
                ))),
            }
        };

        let result = tokio::select! {
            biased;
            () = token.cancelled() => Err(Failure::Cancelled(cancel_reason(token))),
            outcome = bounded => outcome,
        };

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        match result {
            Ok(value) => {
                debug!(stage = %stage, elapsed_ms, "Stage completed");
                Ok(value)
            }
            Err(failure) => {
                let err = match failure {
                    Failure::Engine(cause) => StageError::new(stage, cause),
                    Failure::Timeout(limit) => {
                        StageError::new(stage, format!("timed out after {}ms", limit.as_millis()))
                    }
                    Failure::Cancelled(reason) => StageError::cancelled(stage, &reason),
                };
                warn!(stage = %stage, elapsed_ms, cause = %err.cause, "Stage failed");
                Err(err)
            }
        }
    }
}

fn cancel_reason(token: &CancellationToken) -> String {
    token.reason().unwrap_or_else(|| "cancellation requested".to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
