//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `RunPhase`: the run's lifecycle (running, stopped by a budget, failed, finalized)
//! - `DedupIndex`: ids already claimed for enrichment in this run
//! - `RunState`: counters, accumulated rows and per-window counts

mod dedup;
mod run_phase;
mod run_state;

// Re-export main types
pub use dedup::DedupIndex;
pub use run_phase::RunPhase;
pub use run_state::{HarvestRow, RunState, WindowCount};
