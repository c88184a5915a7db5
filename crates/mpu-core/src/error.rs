//! Caller-visible upload errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::aggregate::ConsistencyError;
use crate::coordinator::RunError;
use crate::planner::PlanError;
use crate::retry::{ErrorKind, TransferError};

/// Why an upload (or a batch of uploads) did not complete.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Bad file size, chunk size or target.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Settings that cannot drive an upload (zero limits, target count mismatch).
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A part failed with a non-retryable error or ran out of retries.
    #[error("part {part_number} failed after {attempts} attempt(s) ({kind:?}): {source}")]
    FatalTransferFailure {
        part_number: u32,
        attempts: u32,
        kind: ErrorKind,
        #[source]
        source: TransferError,
    },
    /// More parts were failing at once than the parallel failure budget allows.
    #[error(
        "{} part(s) failing at once exceeds budget of {budget} (last failure: part {part_number}): {source}",
        failing.len()
    )]
    TooManyConcurrentFailures {
        budget: usize,
        failing: Vec<u32>,
        part_number: u32,
        #[source]
        source: TransferError,
    },
    #[error("upload cancelled")]
    Cancelled,
    #[error("internal consistency error: {0}")]
    Consistency(#[from] ConsistencyError),
    #[error("worker task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    /// One file of a batch failed.
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<UploadError>,
    },
}

impl UploadError {
    pub fn is_cancelled(&self) -> bool {
        match self {
            UploadError::Cancelled => true,
            UploadError::File { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

impl From<PlanError> for UploadError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::TargetCountMismatch { .. } => UploadError::Configuration(e.to_string()),
            PlanError::ZeroSize | PlanError::ZeroChunkSize | PlanError::TooManyParts { .. } => {
                UploadError::InvalidInput(e.to_string())
            }
        }
    }
}

impl From<RunError<TransferError>> for UploadError {
    fn from(e: RunError<TransferError>) -> Self {
        match e {
            RunError::Fatal {
                unit,
                attempts,
                kind,
                source,
            } => UploadError::FatalTransferFailure {
                part_number: unit,
                attempts,
                kind,
                source,
            },
            RunError::TooManyConcurrentFailures {
                budget,
                failing,
                unit,
                source,
            } => UploadError::TooManyConcurrentFailures {
                budget,
                failing,
                part_number: unit,
                source,
            },
            RunError::Cancelled => UploadError::Cancelled,
            RunError::Consistency(c) => UploadError::Consistency(c),
            RunError::TaskJoin(j) => UploadError::TaskJoin(j),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_errors_map_to_input_or_configuration() {
        assert!(matches!(
            UploadError::from(PlanError::ZeroSize),
            UploadError::InvalidInput(_)
        ));
        assert!(matches!(
            UploadError::from(PlanError::TargetCountMismatch { planned: 3, supplied: 2 }),
            UploadError::Configuration(_)
        ));
    }

    #[test]
    fn fatal_run_error_keeps_part_number() {
        let e = UploadError::from(RunError::Fatal {
            unit: 4,
            attempts: 2,
            kind: ErrorKind::Other,
            source: TransferError::Http { status: 403 },
        });
        match e {
            UploadError::FatalTransferFailure { part_number, attempts, .. } => {
                assert_eq!(part_number, 4);
                assert_eq!(attempts, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cancelled_seen_through_file_wrapper() {
        let e = UploadError::File {
            path: PathBuf::from("a.bin"),
            source: Box::new(UploadError::Cancelled),
        };
        assert!(e.is_cancelled());
        assert_eq!(e.to_string(), "a.bin: upload cancelled");
    }
}
