use std::time::Duration;

/// High-level classification of an error for retry purposes.
///
/// This intentionally stays generic; callers map HTTP status codes,
/// transport errors, or IO failures into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read, or HTTP 408).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Any other error (never retried).
    Other,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-enqueue the part once `after` has elapsed.
    Retry { after: Duration },
    /// Stop: the part is terminally failed.
    Abandon,
}

/// Exponential backoff policy with a per-part retry budget.
///
/// Pure: the decision depends only on its inputs; the coordinator owns the
/// per-part attempt counters.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts allowed per part beyond the first.
    pub max_retries: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(300),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries up to `max_retries` times with no delay.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Decide what to do with a failed attempt.
    ///
    /// `attempt` is the 1-based number of the attempt that just failed. A
    /// non-retryable kind is abandoned regardless of the count.
    pub fn decide(&self, part_number: u32, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() || attempt > self.max_retries {
            tracing::trace!(part_number, attempt, ?kind, "retry policy: abandon");
            return RetryDecision::Abandon;
        }
        // base * 2^(attempt-1), capped.
        let exp = 1u32 << attempt.saturating_sub(1).min(16);
        let after = self.base_delay.saturating_mul(exp).min(self.max_delay);
        RetryDecision::Retry { after }
    }
}
