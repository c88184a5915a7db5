//! Engine entry points: upload one file, or a batch of files, in parts.
//!
//! `Uploader` wires the planner, the part transfer worker, the retry policy
//! and the coordinator together. It holds no per-run state; every call
//! returns its own report and statistics.

mod batch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::aggregate::{CompletedMultipartUpload, PartResult};
use crate::coordinator::{run_units, Limits, RunStats};
use crate::error::UploadError;
use crate::planner::UploadPlan;
use crate::retry::RetryPolicy;
use crate::transfer::{PartSource, PartTransport, PartUpload};

pub use batch::{BatchReport, FileUpload};

pub const DEFAULT_CHUNK_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_CONCURRENT_PARTS: usize = 128;
pub const DEFAULT_PARALLEL_FAILURE_BUDGET: usize = 63;
pub const DEFAULT_MAX_RETRIES_PER_PART: u32 = 1;
pub const DEFAULT_MAX_CONCURRENT_FILES: usize = 4;

/// Engine settings for one `Uploader`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Bytes per part; the last part may be shorter.
    pub chunk_size: u64,
    /// Ceiling on part attempts in flight for one file.
    pub max_concurrent_parts: usize,
    /// Parts allowed to be failing at the same time before the upload aborts.
    pub parallel_failure_budget: usize,
    pub max_retries_per_part: u32,
    /// Files uploaded at once by `upload_files`.
    pub max_concurrent_files: usize,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrent_parts: DEFAULT_MAX_CONCURRENT_PARTS,
            parallel_failure_budget: DEFAULT_PARALLEL_FAILURE_BUDGET,
            max_retries_per_part: DEFAULT_MAX_RETRIES_PER_PART,
            max_concurrent_files: DEFAULT_MAX_CONCURRENT_FILES,
            retry_base_delay: retry.base_delay,
            retry_max_delay: retry.max_delay,
        }
    }
}

impl UploadConfig {
    pub fn validate(&self) -> Result<(), UploadError> {
        if self.chunk_size == 0 {
            return Err(UploadError::Configuration("chunk_size must be positive".into()));
        }
        if self.max_concurrent_parts == 0 {
            return Err(UploadError::Configuration(
                "max_concurrent_parts must be at least 1".into(),
            ));
        }
        if self.max_concurrent_files == 0 {
            return Err(UploadError::Configuration(
                "max_concurrent_files must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries_per_part,
            base_delay: self.retry_base_delay,
            max_delay: self.retry_max_delay,
        }
    }

    fn part_limits(&self) -> Limits {
        Limits {
            max_in_flight: self.max_concurrent_parts,
            parallel_failure_budget: self.parallel_failure_budget,
        }
    }
}

/// Outcome of one successful file upload.
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub path: PathBuf,
    pub total_size: u64,
    /// One entry per part, ascending by part number.
    pub parts: Vec<PartResult>,
    pub stats: RunStats,
    pub elapsed: Duration,
}

impl UploadReport {
    /// Body for the store's finalize call.
    pub fn completed_multipart_upload(&self) -> CompletedMultipartUpload {
        CompletedMultipartUpload {
            parts: self.parts.clone(),
        }
    }
}

/// Uploads files in parts through a shared transport.
pub struct Uploader<T: PartTransport> {
    transport: Arc<T>,
    config: UploadConfig,
}

impl<T: PartTransport> Clone for Uploader<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T: PartTransport> Uploader<T> {
    pub fn new(transport: T, config: UploadConfig) -> Self {
        Self::with_shared(Arc::new(transport), config)
    }

    pub fn with_shared(transport: Arc<T>, config: UploadConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Upload `path` in `chunk_size` parts, part N going to `targets[N-1]`.
    ///
    /// Fails before any transfer if the file cannot be opened or planned, or
    /// if the target count does not match the part count. On success the
    /// report holds every part's identifier in part-number order.
    pub async fn upload_file(
        &self,
        path: &Path,
        targets: Vec<T::Target>,
        cancel: &CancellationToken,
    ) -> Result<UploadReport, UploadError> {
        self.config.validate()?;
        let started = Instant::now();
        let source = PartSource::open(path).map_err(|source| UploadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let total_size = source.len();
        let plan = UploadPlan::new(path, total_size, self.config.chunk_size, targets)?;
        let part_count = plan.part_count();

        let span = tracing::info_span!("upload", path = %path.display(), parts = part_count);
        self.transfer_plan(source, plan, started, cancel)
            .instrument(span)
            .await
    }

    async fn transfer_plan(
        &self,
        source: PartSource,
        plan: UploadPlan<T::Target>,
        started: Instant,
        cancel: &CancellationToken,
    ) -> Result<UploadReport, UploadError> {
        let path = plan.path().to_path_buf();
        let total_size = plan.total_size();
        let part_count = plan.part_count();
        tracing::info!(
            total_size,
            chunk_size = self.config.chunk_size,
            max_concurrent_parts = self.config.max_concurrent_parts,
            "starting multipart upload"
        );
        let worker = Arc::new(PartUpload::new(source, Arc::clone(&self.transport), plan));
        let policy = self.config.retry_policy();
        let outcome = run_units(worker, part_count, self.config.part_limits(), &policy, cancel).await?;
        let elapsed = started.elapsed();
        tracing::info!(
            retries = outcome.stats.retries,
            peak_in_flight = outcome.stats.peak_in_flight,
            "uploaded {} parts in {:.2}s",
            part_count,
            elapsed.as_secs_f64()
        );
        Ok(UploadReport {
            path,
            total_size,
            parts: outcome.outputs,
            stats: outcome.stats,
            elapsed,
        })
    }
}
