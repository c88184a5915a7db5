//! Coordinator event loop: admit up to the ceiling, wait for completions or
//! retry deadlines, route failures through the retry policy.

use std::sync::Arc;

use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::aggregate::{Aggregator, ConsistencyError};
use crate::retry::{RetryDecision, RetryPolicy};

use super::state::EngineState;
use super::{Limits, RunError, RunOutcome, RunStats, Worker};

type AttemptResult<W> = (
    u32,
    u32,
    Option<Result<<W as Worker>::Output, <W as Worker>::Error>>,
);

/// Run units 1..=unit_count through `worker` until all succeed or the run aborts.
///
/// The coordinator task is the only owner of `EngineState`; each attempt runs
/// in its own task and reports back through a `JoinSet`. On any abort the
/// workers' child token is cancelled and outstanding attempts are shut down
/// before returning; their results are discarded.
pub async fn run_units<W: Worker>(
    worker: Arc<W>,
    unit_count: u32,
    limits: Limits,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<RunOutcome<W::Output>, RunError<W::Error>> {
    let abort = cancel.child_token();
    let max_in_flight = limits.max_in_flight.max(1);
    let mut state = EngineState::new(unit_count);
    let mut results: Aggregator<W::Output> = Aggregator::new(unit_count);
    let mut tasks: JoinSet<AttemptResult<W>> = JoinSet::new();

    let run: Result<(), RunError<W::Error>> = loop {
        if cancel.is_cancelled() {
            break Err(RunError::Cancelled);
        }

        let now = Instant::now();
        while state.in_flight() < max_in_flight {
            let Some((unit, attempt)) = state.admit(now) else {
                break;
            };
            tracing::debug!(unit, attempt, in_flight = state.in_flight(), "attempt started");
            spawn_attempt(&mut tasks, &worker, &abort, unit, attempt);
        }

        if state.is_finished() {
            break Ok(());
        }
        let next_retry = state.next_retry_at();
        if tasks.is_empty() && next_retry.is_none() {
            break Err(RunError::Consistency(ConsistencyError(format!(
                "no work in flight or queued with {} of {} unit(s) done",
                results.completed(),
                unit_count
            ))));
        }

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Err(RunError::Cancelled),
            joined = tasks.join_next(), if !tasks.is_empty() => joined,
            _ = sleep_until(next_retry.unwrap_or(now)), if next_retry.is_some() => continue,
        };

        let (unit, attempt, result) = match joined {
            Some(Ok(done)) => done,
            Some(Err(e)) => break Err(RunError::TaskJoin(e)),
            None => continue,
        };
        let Some(result) = result else {
            // Only possible once the child token fired, i.e. the caller cancelled.
            break Err(RunError::Cancelled);
        };

        match result {
            Ok(output) => {
                if let Err(e) = state
                    .on_success(unit)
                    .and_then(|()| results.record(unit, output))
                {
                    break Err(e.into());
                }
                tracing::debug!(unit, attempt, done = results.completed(), "attempt succeeded");
            }
            Err(err) => {
                let kind = worker.classify(&err);
                match policy.decide(unit, attempt, kind) {
                    RetryDecision::Retry { after } => {
                        if let Err(e) = state.on_retry(unit, Instant::now() + after) {
                            break Err(e.into());
                        }
                        tracing::debug!(
                            unit,
                            attempt,
                            ?kind,
                            delay_ms = after.as_millis() as u64,
                            failing = state.failing_count(),
                            "attempt failed, retry scheduled: {}",
                            err
                        );
                        if state.failing_count() > limits.parallel_failure_budget {
                            tracing::warn!(
                                budget = limits.parallel_failure_budget,
                                failing = ?state.failing_units(),
                                "too many units failing concurrently, aborting"
                            );
                            break Err(RunError::TooManyConcurrentFailures {
                                budget: limits.parallel_failure_budget,
                                failing: state.failing_units(),
                                unit,
                                source: err,
                            });
                        }
                    }
                    RetryDecision::Abandon => {
                        if let Err(e) = state.on_abandon(unit) {
                            break Err(e.into());
                        }
                        tracing::warn!(unit, attempt, ?kind, "unit failed fatally: {}", err);
                        break Err(RunError::Fatal {
                            unit,
                            attempts: attempt,
                            kind,
                            source: err,
                        });
                    }
                }
            }
        }
    };

    if let Err(e) = run {
        abort.cancel();
        tasks.shutdown().await;
        return Err(e);
    }

    let stats = RunStats {
        attempts: state.total_attempts(),
        retries: state.retries(),
        peak_in_flight: state.peak_in_flight(),
    };
    let outputs = results.finish()?;
    Ok(RunOutcome { outputs, stats })
}

fn spawn_attempt<W: Worker>(
    tasks: &mut JoinSet<AttemptResult<W>>,
    worker: &Arc<W>,
    abort: &CancellationToken,
    unit: u32,
    attempt: u32,
) {
    let worker = Arc::clone(worker);
    let token = abort.clone();
    tasks.spawn(async move {
        let result = tokio::select! {
            _ = token.cancelled() => None,
            r = worker.attempt(unit, attempt) => Some(r),
        };
        (unit, attempt, result)
    });
}
