//! Run budgets and the stop decision
//!
//! Three gates bound a run:
//! - the per-window cap, which only bounds one window's search
//! - the global result budget, applied to new ids after dedup
//! - the global search call budget, which halts the run as soon as it is spent

use crate::config::BudgetConfig;
use crate::state::{RunPhase, RunState};

/// Outcome of the budget check at a loop boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    StopCalls,
    StopResults,
}

impl Decision {
    /// The terminal phase this decision stops the run in, if any
    pub fn stop_phase(&self) -> Option<RunPhase> {
        match self {
            Self::Continue => None,
            Self::StopCalls => Some(RunPhase::StoppedCallBudget),
            Self::StopResults => Some(RunPhase::StoppedResultBudget),
        }
    }
}

/// Budget limits for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetTracker {
    per_window_cap: u32,
    max_total: u32,
    max_search_calls: Option<u32>,
}

impl BudgetTracker {
    pub fn new(per_window_cap: u32, max_total: u32, max_search_calls: Option<u32>) -> Self {
        Self {
            per_window_cap,
            max_total,
            max_search_calls,
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self::new(
            config.per_query_cap,
            config.max_total,
            config.max_search_calls,
        )
    }

    pub fn per_window_cap(&self) -> usize {
        self.per_window_cap as usize
    }

    pub fn max_total(&self) -> u32 {
        self.max_total
    }

    pub fn max_search_calls(&self) -> Option<u32> {
        self.max_search_calls
    }

    /// Search calls still allowed, `None` when unlimited
    pub fn remaining_calls(&self, state: &RunState) -> Option<u32> {
        self.max_search_calls
            .map(|max| max.saturating_sub(state.calls_used))
    }

    /// Videos that may still be enriched
    pub fn remaining_results(&self, state: &RunState) -> u32 {
        self.max_total.saturating_sub(state.total_enriched)
    }

    /// Truncates deduplicated ids to the remaining result budget, keeping order
    ///
    /// # Returns
    ///
    /// The number of ids dropped.
    pub fn trim_to_budget(&self, state: &RunState, ids: &mut Vec<String>) -> usize {
        let room = self.remaining_results(state) as usize;
        if ids.len() <= room {
            return 0;
        }
        tracing::debug!("Result budget trims {} new ids to {}", ids.len(), room);
        let dropped = ids.len() - room;
        ids.truncate(room);
        dropped
    }

    /// Decides whether the run may continue past the current boundary
    ///
    /// The call budget is checked first: once it is spent nothing else can
    /// make progress.
    pub fn decide(&self, state: &RunState) -> Decision {
        if self.remaining_calls(state) == Some(0) {
            Decision::StopCalls
        } else if self.remaining_results(state) == 0 {
            Decision::StopResults
        } else {
            Decision::Continue
        }
    }
}

impl Default for BudgetTracker {
    fn default() -> Self {
        Self::from_config(&BudgetConfig::default())
    }
}
