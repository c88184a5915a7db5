//! Retry and backoff policy.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! connection failures) and exponential backoff decisions so that the
//! coordinator can decide per failed part whether to resubmit it.

mod classify;
mod error;
mod policy;

pub use classify::{classify, classify_http_status, classify_transport_error};
pub use error::TransferError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
