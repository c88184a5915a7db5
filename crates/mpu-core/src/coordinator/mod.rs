//! Bounded-concurrency coordinator.
//!
//! Drives units of work (the parts of one file, or the files of a batch)
//! through `Pending → InFlight → {Succeeded | Retrying → InFlight | FatallyFailed}`
//! with at most `max_in_flight` attempts running at once. Failed attempts go
//! through the retry policy; too many units failing at the same time aborts
//! the whole run.

mod run;
mod state;

use std::future::Future;

use crate::aggregate::ConsistencyError;
use crate::retry::ErrorKind;

pub use run::run_units;
pub use state::{EngineState, UnitState};

/// One retryable unit of work. Units are numbered 1..=N.
///
/// An attempt must be stateless and safe to re-invoke: the coordinator may
/// call it again for the same unit after a retryable failure.
pub trait Worker: Send + Sync + 'static {
    type Output: Send + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run attempt number `attempt` (1-based) for `unit`.
    fn attempt(
        &self,
        unit: u32,
        attempt: u32,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;

    /// Map a failure to its retry classification.
    fn classify(&self, error: &Self::Error) -> ErrorKind;
}

/// Concurrency ceiling and failure budget for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Hard cap on simultaneously running attempts.
    pub max_in_flight: usize,
    /// Maximum number of units allowed to be in a failing streak at once.
    pub parallel_failure_budget: usize,
}

/// Counters for a single run, returned to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Attempts started, including retries.
    pub attempts: u32,
    /// Retries scheduled after retryable failures.
    pub retries: u32,
    /// Highest number of attempts observed in flight at once.
    pub peak_in_flight: usize,
}

/// Successful run: one output per unit in ascending unit order.
#[derive(Debug)]
pub struct RunOutcome<T> {
    pub outputs: Vec<T>,
    pub stats: RunStats,
}

/// Why a run stopped before every unit succeeded.
#[derive(Debug)]
pub enum RunError<E> {
    /// A unit failed with a non-retryable error or exhausted its retries.
    Fatal {
        unit: u32,
        attempts: u32,
        kind: ErrorKind,
        source: E,
    },
    /// More units were failing at once than the budget allows.
    TooManyConcurrentFailures {
        budget: usize,
        failing: Vec<u32>,
        unit: u32,
        source: E,
    },
    /// The caller's cancellation token fired.
    Cancelled,
    /// Internal invariant violation.
    Consistency(ConsistencyError),
    /// A worker task panicked or was aborted outside the coordinator's control.
    TaskJoin(tokio::task::JoinError),
}

impl<E> From<ConsistencyError> for RunError<E> {
    fn from(e: ConsistencyError) -> Self {
        RunError::Consistency(e)
    }
}
