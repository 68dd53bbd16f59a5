/// Run phase definitions for tracking harvest progress
///
/// A run moves `NotStarted -> Running -> <terminal> -> Finalized`, where the
/// terminal phase records why the run stopped.
use std::fmt;

/// Represents the current phase of a harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunPhase {
    /// Run has been created but no call has been made
    #[default]
    NotStarted,

    /// Queries are being processed
    Running,

    // ===== Terminal States =====
    /// The search call budget reached zero
    StoppedCallBudget,

    /// The global result budget reached zero
    StoppedResultBudget,

    /// Every query and window was processed
    ExhaustedQueries,

    /// A remote call or checkpoint write failed unrecoverably
    Failed,

    /// The final checkpoint has been written
    Finalized,
}

impl RunPhase {
    /// Returns true for the phases a running harvest can stop in
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::StoppedCallBudget
                | Self::StoppedResultBudget
                | Self::ExhaustedQueries
                | Self::Failed
        )
    }

    /// Returns true if the run stopped because a budget ran out
    pub fn is_budget_stop(&self) -> bool {
        matches!(self, Self::StoppedCallBudget | Self::StoppedResultBudget)
    }

    /// Returns true if `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        match self {
            Self::NotStarted => matches!(next, Self::Running | Self::Failed),
            Self::Running => next.is_terminal(),
            s if s.is_terminal() => next == Self::Finalized,
            _ => false,
        }
    }

    /// Converts the phase to the string used in summaries and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::StoppedCallBudget => "stopped_call_budget",
            Self::StoppedResultBudget => "stopped_result_budget",
            Self::ExhaustedQueries => "exhausted_queries",
            Self::Failed => "failed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
