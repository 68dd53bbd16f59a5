//! Output sink traits and error types
//!
//! This module defines the trait interface for checkpoint sinks and the
//! associated error type.

use crate::state::RunState;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed checkpoint: {0}")]
    Format(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for checkpoint snapshots
///
/// Every call receives the whole run state and must replace any previous
/// snapshot; writing the same state twice must produce the same content.
pub trait CheckpointSink {
    /// Persists `rows` and `counts` of the given state
    fn write_checkpoint(&self, state: &RunState) -> OutputResult<()>;
}

impl<S: CheckpointSink + ?Sized> CheckpointSink for &S {
    fn write_checkpoint(&self, state: &RunState) -> OutputResult<()> {
        (**self).write_checkpoint(state)
    }
}
