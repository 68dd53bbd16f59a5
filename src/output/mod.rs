//! Output module for checkpoints and run reports
//!
//! This module handles:
//! - Writing the row and counts tables as full-snapshot CSV checkpoints
//! - Reading a prior row table back to pre-seed deduplication
//! - Generating a markdown summary of a finished run

mod checkpoint;
mod markdown;
mod traits;

pub use checkpoint::{load_checkpoint_ids, CsvCheckpointWriter, COUNT_COLUMNS, ROW_COLUMNS};
pub use markdown::{format_run_summary, generate_run_summary};
pub use traits::{CheckpointSink, OutputError, OutputResult};
