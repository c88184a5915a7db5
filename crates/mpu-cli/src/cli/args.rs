//! Per-invocation overrides for engine settings.

use clap::Args;
use mpu_core::UploadConfig;

/// Flags shared by `upload` and `batch`; unset flags keep the config file values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct TuningArgs {
    /// Part size in bytes (suffixes K, M, G accepted, binary units).
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,
    /// Part uploads in flight at once.
    #[arg(long, value_name = "N")]
    pub max_concurrent_parts: Option<usize>,
    /// Parts allowed to be failing at the same time before giving up.
    #[arg(long, value_name = "N")]
    pub parallel_failures: Option<usize>,
    /// Retries per part after the first attempt.
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,
}

impl TuningArgs {
    pub fn apply(&self, cfg: &mut UploadConfig) {
        if let Some(v) = self.chunk_size {
            cfg.chunk_size = v;
        }
        if let Some(v) = self.max_concurrent_parts {
            cfg.max_concurrent_parts = v;
        }
        if let Some(v) = self.parallel_failures {
            cfg.parallel_failure_budget = v;
        }
        if let Some(v) = self.max_retries {
            cfg.max_retries_per_part = v;
        }
    }
}

/// Parse `1048576`, `512K`, `10M`, `10MiB` or `1G` into bytes.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (num, unit) = s.split_at(digits_end);
    let n: u64 = num
        .parse()
        .map_err(|_| format!("invalid size {:?}: expected a number", s))?;
    let shift = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" | "kib" => 10,
        "m" | "mb" | "mib" => 20,
        "g" | "gb" | "gib" => 30,
        other => return Err(format!("unknown size unit {:?}", other)),
    };
    n.checked_mul(1u64 << shift)
        .ok_or_else(|| format!("size {:?} overflows", s))
}
