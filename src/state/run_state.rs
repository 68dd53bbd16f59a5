//! Mutable state of a single harvest run

use crate::record::VideoRecord;
use crate::state::{DedupIndex, RunPhase};
use crate::window::Window;
use crate::HarvestError;

/// One enriched video together with the query and window that found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestRow {
    pub query: String,
    pub window: Window,
    pub record: VideoRecord,
}

/// Per-query-per-window harvest summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCount {
    pub query: String,
    pub window: Window,

    /// Ids returned by the search for this window, before dedup
    pub raw_count: usize,

    /// New ids sent to enrichment; `None` when nothing was enriched
    pub unique_new: Option<usize>,
}

/// Everything a run accumulates
///
/// A single value per run, threaded by `&mut` through the driver and the
/// components it calls.
#[derive(Debug, Default)]
pub struct RunState {
    pub seen: DedupIndex,
    pub total_enriched: u32,

    /// Search calls issued (the budgeted resource)
    pub calls_used: u32,

    /// Bulk detail calls issued, for diagnostics only
    pub detail_calls: u32,

    pub rows: Vec<HarvestRow>,
    pub counts: Vec<WindowCount>,
    phase: RunPhase,

    /// `total_enriched` at the last periodic checkpoint
    checkpointed_total: u32,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state whose dedup index already contains `ids`
    pub fn with_seen<I: IntoIterator<Item = String>>(ids: I) -> Self {
        let mut state = Self::default();
        state.seen.extend(ids);
        state
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Moves the run to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: RunPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Run phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Appends enriched records with their provenance
    pub fn record_enriched(&mut self, query: &str, window: Window, records: Vec<VideoRecord>) {
        self.total_enriched += records.len() as u32;
        self.rows.extend(records.into_iter().map(|record| HarvestRow {
            query: query.to_string(),
            window,
            record,
        }));
    }

    /// Appends a window summary
    pub fn record_count(
        &mut self,
        query: &str,
        window: Window,
        raw_count: usize,
        unique_new: Option<usize>,
    ) {
        self.counts.push(WindowCount {
            query: query.to_string(),
            window,
            raw_count,
            unique_new,
        });
    }

    /// Returns true if a multiple of `every` was crossed since the last periodic checkpoint
    pub fn checkpoint_due(&self, every: u32) -> bool {
        let every = every.max(1);
        self.total_enriched / every > self.checkpointed_total / every
    }

    /// Records that a periodic checkpoint covered everything enriched so far
    pub fn mark_checkpointed(&mut self) {
        self.checkpointed_total = self.total_enriched;
    }
}
