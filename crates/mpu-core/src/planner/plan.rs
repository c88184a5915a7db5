//! Immutable per-file upload plan: ranges paired with their transfer targets.

use std::path::{Path, PathBuf};

use super::range::{part_count, plan_parts, PartRange, PlanError};

/// One part of the plan: its byte range plus the opaque destination it is sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSpec<T> {
    pub range: PartRange,
    pub target: T,
}

impl<T> PartSpec<T> {
    pub fn part_number(&self) -> u32 {
        self.range.part_number
    }
}

/// Plan derived once per file. Ranges partition [0, total_size) and part
/// numbers are the dense sequence 1..=N in target order.
#[derive(Debug, Clone)]
pub struct UploadPlan<T> {
    path: PathBuf,
    total_size: u64,
    chunk_size: u64,
    parts: Vec<PartSpec<T>>,
}

impl<T> UploadPlan<T> {
    /// Plan `total_size` bytes of `path` into `chunk_size` parts, one per target.
    /// Fails before any transfer if the target list does not match the part count.
    pub fn new(
        path: &Path,
        total_size: u64,
        chunk_size: u64,
        targets: Vec<T>,
    ) -> Result<Self, PlanError> {
        // Check the count before materializing ranges; a tiny chunk size on a
        // large file would otherwise allocate the whole plan first.
        let planned = part_count(total_size, chunk_size)?;
        if planned as usize != targets.len() {
            return Err(PlanError::TargetCountMismatch {
                planned,
                supplied: targets.len(),
            });
        }
        let ranges = plan_parts(total_size, chunk_size)?;
        let parts = ranges
            .into_iter()
            .zip(targets)
            .map(|(range, target)| PartSpec { range, target })
            .collect();
        Ok(Self {
            path: path.to_path_buf(),
            total_size,
            chunk_size,
            parts,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn part_count(&self) -> u32 {
        self.parts.len() as u32
    }

    pub fn parts(&self) -> &[PartSpec<T>] {
        &self.parts
    }

    /// Part by 1-based number.
    pub fn part(&self, part_number: u32) -> Option<&PartSpec<T>> {
        part_number
            .checked_sub(1)
            .and_then(|i| self.parts.get(i as usize))
    }
}
