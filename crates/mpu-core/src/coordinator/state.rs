//! Per-run engine state, owned exclusively by the coordinator task.

use std::collections::{BTreeSet, VecDeque};

use tokio::time::Instant;

use crate::aggregate::ConsistencyError;

/// Lifecycle of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    InFlight,
    /// Failed retryably; waiting for its backoff to elapse before re-admission.
    Retrying,
    Succeeded,
    FatallyFailed,
}

/// Queues, counters and per-unit states for one run. Never shared with workers;
/// they only report outcomes back to the coordinator.
#[derive(Debug)]
pub struct EngineState {
    states: Vec<UnitState>,
    attempts: Vec<u32>,
    pending: VecDeque<u32>,
    retry_after: Vec<(Instant, u32)>,
    in_flight: usize,
    peak_in_flight: usize,
    /// Units between a failure and either a successful retry or abandonment.
    failing: BTreeSet<u32>,
    cumulative_failures: u32,
    retries: u32,
    succeeded: u32,
}

impl EngineState {
    /// All units 1..=unit_count start Pending, queued in ascending order.
    pub fn new(unit_count: u32) -> Self {
        Self {
            states: vec![UnitState::Pending; unit_count as usize],
            attempts: vec![0; unit_count as usize],
            pending: (1..=unit_count).collect(),
            retry_after: Vec::new(),
            in_flight: 0,
            peak_in_flight: 0,
            failing: BTreeSet::new(),
            cumulative_failures: 0,
            retries: 0,
            succeeded: 0,
        }
    }

    pub fn unit_count(&self) -> u32 {
        self.states.len() as u32
    }

    pub fn state(&self, unit: u32) -> Option<UnitState> {
        unit.checked_sub(1)
            .and_then(|i| self.states.get(i as usize))
            .copied()
    }

    /// Attempts started so far for `unit`.
    pub fn attempts(&self, unit: u32) -> u32 {
        unit.checked_sub(1)
            .and_then(|i| self.attempts.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight
    }

    pub fn failing_count(&self) -> usize {
        self.failing.len()
    }

    pub fn failing_units(&self) -> Vec<u32> {
        self.failing.iter().copied().collect()
    }

    pub fn cumulative_failures(&self) -> u32 {
        self.cumulative_failures
    }

    pub fn total_attempts(&self) -> u32 {
        self.attempts.iter().sum()
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// True once every unit has succeeded.
    pub fn is_finished(&self) -> bool {
        self.succeeded == self.unit_count()
    }

    /// Earliest instant at which a delayed retry becomes admissible.
    pub fn next_retry_at(&self) -> Option<Instant> {
        self.retry_after.iter().map(|(t, _)| *t).min()
    }

    /// Admit the next unit: fresh pending units first, then retries whose
    /// backoff has elapsed by `now`. Returns `(unit, attempt)` with the
    /// 1-based attempt number. The caller enforces the in-flight ceiling.
    pub fn admit(&mut self, now: Instant) -> Option<(u32, u32)> {
        let unit = match self.pending.pop_front() {
            Some(unit) => unit,
            None => {
                let pos = self
                    .retry_after
                    .iter()
                    .enumerate()
                    .filter(|(_, (t, _))| now >= *t)
                    .min_by_key(|(_, (t, _))| *t)
                    .map(|(pos, _)| pos)?;
                self.retry_after.swap_remove(pos).1
            }
        };
        let i = (unit - 1) as usize;
        self.states[i] = UnitState::InFlight;
        self.attempts[i] += 1;
        self.in_flight += 1;
        self.peak_in_flight = self.peak_in_flight.max(self.in_flight);
        Some((unit, self.attempts[i]))
    }

    /// InFlight → Succeeded; clears the unit from the failing set.
    pub fn on_success(&mut self, unit: u32) -> Result<(), ConsistencyError> {
        self.leave_in_flight(unit, UnitState::Succeeded)?;
        self.failing.remove(&unit);
        self.succeeded += 1;
        Ok(())
    }

    /// InFlight → Retrying; the unit is re-admissible from `at` and counts as failing.
    pub fn on_retry(&mut self, unit: u32, at: Instant) -> Result<(), ConsistencyError> {
        self.leave_in_flight(unit, UnitState::Retrying)?;
        self.failing.insert(unit);
        self.cumulative_failures += 1;
        self.retries += 1;
        self.retry_after.push((at, unit));
        Ok(())
    }

    /// InFlight → FatallyFailed.
    pub fn on_abandon(&mut self, unit: u32) -> Result<(), ConsistencyError> {
        self.leave_in_flight(unit, UnitState::FatallyFailed)?;
        self.failing.remove(&unit);
        self.cumulative_failures += 1;
        Ok(())
    }

    fn leave_in_flight(&mut self, unit: u32, next: UnitState) -> Result<(), ConsistencyError> {
        match self.state(unit) {
            Some(UnitState::InFlight) => {
                self.states[(unit - 1) as usize] = next;
                self.in_flight -= 1;
                Ok(())
            }
            other => Err(ConsistencyError(format!(
                "unit {} reported an outcome while {:?}",
                unit, other
            ))),
        }
    }
}
