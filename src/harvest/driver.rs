//! Run driver - orchestrates queries x windows
//!
//! The driver owns the run loop:
//! - asks the budget tracker whether to continue at every query and window boundary
//! - walks the search frontier for each window
//! - deduplicates, trims to the result budget, and enriches the new ids
//! - writes periodic checkpoints and exactly one final checkpoint
//!
//! The final checkpoint is owned by [`RunScope`]: `finalize` writes it on every
//! normal exit and `Drop` writes it if the run future is cancelled or unwinds.

use crate::api::{SearchOrder, VideoApi};
use crate::config::Config;
use crate::harvest::budget::BudgetTracker;
use crate::harvest::enricher::MetadataEnricher;
use crate::harvest::frontier::{FrontierWalker, WalkStop};
use crate::harvest::retry::RetryPolicy;
use crate::output::CheckpointSink;
use crate::state::{RunPhase, RunState};
use crate::window::Window;
use crate::HarvestError;
use std::collections::HashSet;
use std::time::Duration;

/// Quota units charged for one search call
pub const SEARCH_QUOTA_UNITS: u64 = 100;

/// Tunables of a run, resolved from the configuration
#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub order: SearchOrder,
    pub page_size: u32,
    pub page_delay: Duration,
    pub retry: RetryPolicy,
    pub budget: BudgetTracker,
    pub checkpoint_every: u32,
}

impl HarvestSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            order: config.search.order,
            page_size: config.api.page_size,
            page_delay: Duration::from_millis(config.api.page_delay_ms),
            retry: RetryPolicy::from_config(&config.retry),
            budget: BudgetTracker::from_config(&config.budget),
            checkpoint_every: config.budget.checkpoint_every,
        }
    }
}

/// Outcome of a run, as reported to the caller and the markdown summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Terminal phase the run stopped in
    pub phase: RunPhase,
    pub queries: usize,
    /// Windows per query
    pub windows: usize,
    /// Query/window pairs that produced a counts row
    pub windows_searched: usize,
    pub rows_written: usize,
    pub total_enriched: u32,
    pub calls_used: u32,
    pub detail_calls: u32,
    pub max_search_calls: Option<u32>,
    pub max_total: u32,
    pub failure: Option<String>,
}

impl RunReport {
    /// Approximate quota cost of the search calls
    pub fn search_quota_units(&self) -> u64 {
        u64::from(self.calls_used) * SEARCH_QUOTA_UNITS
    }
}

/// Owns the run state for the duration of a run
struct RunScope<'s, S: CheckpointSink> {
    state: RunState,
    sink: &'s S,
    finalized: bool,
}

impl<'s, S: CheckpointSink> RunScope<'s, S> {
    fn open(mut state: RunState, sink: &'s S) -> Result<Self, HarvestError> {
        state.transition(RunPhase::Running)?;
        Ok(Self {
            state,
            sink,
            finalized: false,
        })
    }

    fn state(&self) -> &RunState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    /// Enters the terminal phase, writes the final checkpoint, and hands back the state
    ///
    /// # Returns
    ///
    /// The final state, the terminal phase the run stopped in, and the first
    /// error of the run or of the final write.
    fn finalize(
        mut self,
        outcome: Result<RunPhase, HarvestError>,
    ) -> (RunState, RunPhase, Result<(), HarvestError>) {
        self.finalized = true;

        let (stop, mut cause) = match outcome {
            Ok(phase) => (phase, None),
            Err(e) => (RunPhase::Failed, Some(e)),
        };

        if let Err(e) = self.state.transition(stop) {
            cause.get_or_insert(e);
        }

        match self.sink.write_checkpoint(&self.state) {
            Ok(()) => tracing::info!(
                "Final checkpoint: {} rows, {} count rows",
                self.state.rows.len(),
                self.state.counts.len()
            ),
            Err(e) => {
                tracing::error!("Final checkpoint failed: {}", e);
                cause.get_or_insert(e.into());
            }
        }

        if let Err(e) = self.state.transition(RunPhase::Finalized) {
            cause.get_or_insert(e);
        }

        let state = std::mem::take(&mut self.state);
        (state, stop, cause.map_or(Ok(()), Err))
    }
}

impl<S: CheckpointSink> Drop for RunScope<'_, S> {
    fn drop(&mut self) {
        if self.finalized {
            return;
        }

        tracing::warn!("Run interrupted; writing final checkpoint");
        if self.state.phase() == RunPhase::Running {
            let _ = self.state.transition(RunPhase::Failed);
        }
        if let Err(e) = self.sink.write_checkpoint(&self.state) {
            tracing::error!("Final checkpoint failed: {}", e);
        }
        let _ = self.state.transition(RunPhase::Finalized);
    }
}

/// Drives a harvest over every query and window
pub struct Harvester<A: VideoApi, S: CheckpointSink> {
    api: A,
    sink: S,
    settings: HarvestSettings,
    queries: Vec<String>,
    windows: Vec<Window>,
}

impl<A: VideoApi, S: CheckpointSink> Harvester<A, S> {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `api` - Search and detail collaborator
    /// * `sink` - Destination of checkpoint snapshots
    /// * `settings` - Budgets, retry policy, and search parameters
    /// * `queries` - Queries in priority order
    /// * `windows` - Publish-time windows searched for every query
    pub fn new(
        api: A,
        sink: S,
        settings: HarvestSettings,
        queries: Vec<String>,
        windows: Vec<Window>,
    ) -> Self {
        Self {
            api,
            sink,
            settings,
            queries,
            windows,
        }
    }

    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs the harvest from an empty state
    pub async fn run(&self) -> Result<RunReport, HarvestError> {
        self.run_with_state(RunState::new()).await
    }

    /// Runs the harvest from `state`, typically one with a pre-seeded dedup index
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - The run stopped on a budget or ran out of queries
    /// * `Err(HarvestError::Aborted)` - A call failed fatally or the final
    ///   checkpoint could not be written; the report is attached
    pub async fn run_with_state(&self, state: RunState) -> Result<RunReport, HarvestError> {
        let mut scope = RunScope::open(state, &self.sink)?;
        tracing::info!(
            "Starting harvest: {} queries x {} windows",
            self.queries.len(),
            self.windows.len()
        );

        let outcome = self.drive(scope.state_mut()).await;
        tracing::debug!("Run loop ended after {} windows", scope.state().counts.len());

        let (state, phase, result) = scope.finalize(outcome);
        let report = self.report(&state, phase, result.as_ref().err());

        tracing::info!(
            "Harvest {}: {} rows, {} search calls (~{} quota units), {} detail calls",
            report.phase,
            report.rows_written,
            report.calls_used,
            report.search_quota_units(),
            report.detail_calls
        );

        match result {
            Ok(()) => Ok(report),
            Err(source) => Err(HarvestError::Aborted {
                report: Box::new(report),
                source: Box::new(source),
            }),
        }
    }

    fn report(&self, state: &RunState, phase: RunPhase, failure: Option<&HarvestError>) -> RunReport {
        RunReport {
            phase,
            queries: self.queries.len(),
            windows: self.windows.len(),
            windows_searched: state.counts.len(),
            rows_written: state.rows.len(),
            total_enriched: state.total_enriched,
            calls_used: state.calls_used,
            detail_calls: state.detail_calls,
            max_search_calls: self.settings.budget.max_search_calls(),
            max_total: self.settings.budget.max_total(),
            failure: failure.map(|e| e.to_string()),
        }
    }

    /// The nested query/window loop; returns the phase the run stopped in
    async fn drive(&self, state: &mut RunState) -> Result<RunPhase, HarvestError> {
        let walker = FrontierWalker::new(
            &self.api,
            &self.settings.retry,
            self.settings.order,
            self.settings.page_size,
            self.settings.page_delay,
        );
        let enricher = MetadataEnricher::new(&self.api, &self.settings.retry);
        let budget = &self.settings.budget;

        // Budget that cut the most recent window short, if any
        let mut last_cut = None;

        for (q_idx, query) in self.queries.iter().enumerate() {
            if let Some(phase) = budget.decide(state).stop_phase() {
                tracing::info!("Stopping before query '{}': {}", query, phase);
                return Ok(phase);
            }
            tracing::info!("[{}/{}] Query: {}", q_idx + 1, self.queries.len(), query);

            let mut query_seen: HashSet<String> = HashSet::new();
            let rows_before = state.rows.len();
            let mut stopped = None;

            for (w_idx, window) in self.windows.iter().enumerate() {
                if let Some(phase) = budget.decide(state).stop_phase() {
                    tracing::info!("Stopping within query '{}': {}", query, phase);
                    stopped = Some(phase);
                    break;
                }
                tracing::info!("  Window {}/{} {}", w_idx + 1, self.windows.len(), window);

                last_cut = self
                    .harvest_window(&walker, &enricher, state, query, *window, &mut query_seen)
                    .await?;
            }

            tracing::info!(
                "Query '{}': {} unique ids seen, {} rows added",
                query,
                query_seen.len(),
                state.rows.len() - rows_before
            );

            if let Some(phase) = stopped {
                return Ok(phase);
            }
        }

        match last_cut {
            Some(phase) => {
                tracing::info!("Last window ended on a budget: {}", phase);
                Ok(phase)
            }
            None => Ok(RunPhase::ExhaustedQueries),
        }
    }

    /// Searches, dedups, trims, and enriches one query/window
    ///
    /// # Returns
    ///
    /// The stop phase of a budget that left work in this window undone:
    /// search pages the call budget did not allow, or new ids the result
    /// budget dropped or could no longer admit.
    async fn harvest_window(
        &self,
        walker: &FrontierWalker<'_, A>,
        enricher: &MetadataEnricher<'_, A>,
        state: &mut RunState,
        query: &str,
        window: Window,
        query_seen: &mut HashSet<String>,
    ) -> Result<Option<RunPhase>, HarvestError> {
        let budget = &self.settings.budget;

        let harvest = walker
            .collect(
                query,
                window,
                budget.per_window_cap(),
                budget.remaining_calls(state),
            )
            .await?;
        state.calls_used += harvest.calls;
        let calls_cut =
            (harvest.stop == WalkStop::CallBudget).then_some(RunPhase::StoppedCallBudget);

        let raw = harvest.ids.len();
        if raw == 0 {
            state.record_count(query, window, 0, None);
            return Ok(calls_cut);
        }
        query_seen.extend(harvest.ids.iter().cloned());

        let mut new_ids = state.seen.claim_new(&harvest.ids);
        let dropped = budget.trim_to_budget(state, &mut new_ids);

        if new_ids.is_empty() {
            state.record_count(query, window, raw, None);
            tracing::info!(
                "    collected ids: {}  new unique: 0  total_enriched: {}  search_calls_used: {}",
                raw,
                state.total_enriched,
                state.calls_used
            );
            return Ok(calls_cut.or(self.results_cut(state, dropped)));
        }

        let mut records = Vec::with_capacity(new_ids.len());
        let enriched = enricher.enrich(&new_ids, &mut records).await;

        // Keep whatever completed batches returned, even when a later batch failed
        records.truncate(budget.remaining_results(state) as usize);
        state.record_enriched(query, window, records);
        state.detail_calls += enriched?;
        state.record_count(query, window, raw, Some(new_ids.len()));

        tracing::info!(
            "    collected ids: {}  new unique: {}  total_enriched: {}  search_calls_used: {}",
            raw,
            new_ids.len(),
            state.total_enriched,
            state.calls_used
        );

        if state.checkpoint_due(self.settings.checkpoint_every) {
            tracing::info!("    checkpoint: writing {} rows", state.rows.len());
            self.sink.write_checkpoint(state)?;
            state.mark_checkpointed();
        }

        Ok(calls_cut.or(self.results_cut(state, dropped)))
    }

    /// Whether the result budget dropped new ids or is now spent
    fn results_cut(&self, state: &RunState, dropped: usize) -> Option<RunPhase> {
        (dropped > 0 || self.settings.budget.remaining_results(state) == 0)
            .then_some(RunPhase::StoppedResultBudget)
    }
}
