//! Cooperative cancellation of pipeline runs.
//!
//! The orchestrator never cancels on its own; a deployment that wraps a run
//! in a deadline (or a user pressing "stop") trips the token, and the stage
//! in flight is then reported as failed.

mod token;

pub use token::CancellationToken;
