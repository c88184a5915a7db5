//! Part type and fixed-chunk range planning.

use thiserror::Error;

/// Largest part number S3 accepts. Other S3-compatible stores may differ,
/// so exceeding it is only logged.
pub const S3_MAX_PARTS: u32 = 10_000;

/// Reasons a file cannot be planned into parts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("file size is zero or unknown; multipart upload needs a known size")]
    ZeroSize,
    #[error("chunk size must be positive")]
    ZeroChunkSize,
    #[error("{total_size} bytes in chunks of {chunk_size} needs more parts than fit in a u32")]
    TooManyParts { total_size: u64, chunk_size: u64 },
    #[error("planned {planned} part(s) but {supplied} target(s) were supplied")]
    TargetCountMismatch { planned: u32, supplied: usize },
}

/// A single part: byte range [offset, offset + length) with its 1-based number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// 1-based multipart part number.
    pub part_number: u32,
    /// Start offset (inclusive).
    pub offset: u64,
    /// Length in bytes (never zero).
    pub length: u64,
}

impl PartRange {
    /// End offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// Inclusive byte span for logs: `bytes start-(end-1)`.
    pub fn span(&self) -> String {
        format!("bytes {}-{}", self.offset, self.end() - 1)
    }
}

/// Number of parts needed for `total_size` bytes in `chunk_size` chunks: ceil(size / chunk).
pub fn part_count(total_size: u64, chunk_size: u64) -> Result<u32, PlanError> {
    if total_size == 0 {
        return Err(PlanError::ZeroSize);
    }
    if chunk_size == 0 {
        return Err(PlanError::ZeroChunkSize);
    }
    let n = total_size.div_ceil(chunk_size);
    u32::try_from(n).map_err(|_| PlanError::TooManyParts {
        total_size,
        chunk_size,
    })
}

/// Builds the part plan for a given total size and chunk size.
///
/// Every part is `chunk_size` bytes except the last, which holds the remainder.
/// The ranges partition [0, total_size) exactly.
pub fn plan_parts(total_size: u64, chunk_size: u64) -> Result<Vec<PartRange>, PlanError> {
    let count = part_count(total_size, chunk_size)?;
    if count > S3_MAX_PARTS {
        tracing::warn!(
            parts = count,
            limit = S3_MAX_PARTS,
            "part count exceeds the S3 limit; the store may reject high part numbers"
        );
    }

    let mut out = Vec::with_capacity(count as usize);
    let mut offset = 0u64;
    for part_number in 1..=count {
        let length = chunk_size.min(total_size - offset);
        out.push(PartRange {
            part_number,
            offset,
            length,
        });
        offset += length;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partitions(parts: &[PartRange], total_size: u64) {
        let mut expected_offset = 0;
        for (i, p) in parts.iter().enumerate() {
            assert_eq!(p.part_number as usize, i + 1);
            assert_eq!(p.offset, expected_offset, "gap or overlap before part {}", p.part_number);
            assert!(p.length > 0);
            expected_offset = p.end();
        }
        assert_eq!(expected_offset, total_size);
    }

    #[test]
    fn plan_parts_with_short_tail() {
        let parts = plan_parts(25_000_000, 10_000_000).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!((parts[0].offset, parts[0].end()), (0, 10_000_000));
        assert_eq!((parts[1].offset, parts[1].end()), (10_000_000, 20_000_000));
        assert_eq!((parts[2].offset, parts[2].end()), (20_000_000, 25_000_000));
    }

    #[test]
    fn plan_parts_exact_multiple() {
        let parts = plan_parts(1000, 250).unwrap();
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(|p| p.length == 250));
        assert_partitions(&parts, 1000);
    }

    #[test]
    fn plan_parts_chunk_larger_than_file() {
        let parts = plan_parts(100, 4096).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].length, 100);
    }

    #[test]
    fn plan_parts_partition_many_sizes() {
        for total in [1u64, 2, 7, 99, 100, 101, 4095, 4096, 4097, 1 << 20] {
            for chunk in [1u64, 3, 64, 100, 4096] {
                let parts = plan_parts(total, chunk).unwrap();
                assert_eq!(parts.len() as u64, total.div_ceil(chunk), "total={} chunk={}", total, chunk);
                assert_partitions(&parts, total);
            }
        }
    }

    #[test]
    fn plan_parts_rejects_zero() {
        assert_eq!(plan_parts(0, 10), Err(PlanError::ZeroSize));
        assert_eq!(plan_parts(10, 0), Err(PlanError::ZeroChunkSize));
    }

    #[test]
    fn part_count_overflow_is_rejected() {
        assert!(matches!(
            part_count(u64::MAX, 1),
            Err(PlanError::TooManyParts { .. })
        ));
    }

    #[test]
    fn part_span_is_inclusive() {
        let p = PartRange { part_number: 1, offset: 42, length: 1 };
        assert_eq!(p.span(), "bytes 42-42");
    }
}
