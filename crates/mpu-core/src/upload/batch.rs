//! Several files through the same coordinator, one unit per file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::coordinator::{run_units, Limits, RunError, RunStats, Worker};
use crate::error::UploadError;
use crate::retry::{ErrorKind, RetryPolicy};
use crate::transfer::PartTransport;

use super::{UploadReport, Uploader};

/// One file of a batch and its per-part targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload<T> {
    pub path: PathBuf,
    pub targets: Vec<T>,
}

/// Outcome of a successful batch: reports in input order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub reports: Vec<UploadReport>,
    pub stats: RunStats,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn files_uploaded(&self) -> usize {
        self.reports.len()
    }

    pub fn bytes_uploaded(&self) -> u64 {
        self.reports.iter().map(|r| r.total_size).sum()
    }
}

/// Unit N uploads file N of the batch. Whole files are never retried; part
/// retries happen inside each file's own run.
struct FileBatch<T: PartTransport> {
    uploader: Uploader<T>,
    files: Vec<FileUpload<T::Target>>,
    cancel: CancellationToken,
}

impl<T: PartTransport> Worker for FileBatch<T> {
    type Output = UploadReport;
    type Error = UploadError;

    async fn attempt(&self, unit: u32, _attempt: u32) -> Result<UploadReport, UploadError> {
        let file = unit
            .checked_sub(1)
            .and_then(|i| self.files.get(i as usize))
            .ok_or_else(|| UploadError::InvalidInput(format!("no file {} in batch", unit)))?;
        self.uploader
            .upload_file(&file.path, file.targets.clone(), &self.cancel)
            .await
            .map_err(|e| UploadError::File {
                path: file.path.clone(),
                source: Box::new(e),
            })
    }

    fn classify(&self, _error: &UploadError) -> ErrorKind {
        ErrorKind::Other
    }
}

impl<T: PartTransport> Uploader<T> {
    /// Upload every file, at most `max_concurrent_files` at once. The first
    /// failing file aborts the batch and cancels the others.
    pub async fn upload_files(
        &self,
        files: Vec<FileUpload<T::Target>>,
        cancel: &CancellationToken,
    ) -> Result<BatchReport, UploadError> {
        self.config.validate()?;
        let started = Instant::now();
        let file_count = u32::try_from(files.len())
            .map_err(|_| UploadError::InvalidInput("too many files in one batch".into()))?;
        tracing::info!(
            files = file_count,
            max_concurrent_files = self.config.max_concurrent_files,
            "starting batch upload"
        );
        let worker = Arc::new(FileBatch {
            uploader: self.clone(),
            files,
            cancel: cancel.child_token(),
        });
        let limits = Limits {
            max_in_flight: self.config.max_concurrent_files,
            parallel_failure_budget: 0,
        };
        let outcome = run_units(worker, file_count, limits, &RetryPolicy::immediate(0), cancel)
            .await
            .map_err(batch_error)?;
        let elapsed = started.elapsed();
        tracing::info!("uploaded {} files in {:.2}s", file_count, elapsed.as_secs_f64());
        Ok(BatchReport {
            reports: outcome.outputs,
            stats: outcome.stats,
            elapsed,
        })
    }
}

fn batch_error(e: RunError<UploadError>) -> UploadError {
    let failed = match e {
        RunError::Fatal { source, .. } | RunError::TooManyConcurrentFailures { source, .. } => {
            source
        }
        RunError::Cancelled => return UploadError::Cancelled,
        RunError::Consistency(c) => return UploadError::Consistency(c),
        RunError::TaskJoin(j) => return UploadError::TaskJoin(j),
    };
    if failed.is_cancelled() {
        UploadError::Cancelled
    } else {
        failed
    }
}
