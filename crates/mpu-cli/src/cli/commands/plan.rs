//! `mpu plan` – print the part layout for a file.

use anyhow::{Context, Result};
use mpu_core::planner::{plan_parts, S3_MAX_PARTS};
use std::fs;
use std::path::Path;

pub fn run_plan(file: &Path, chunk_size: u64) -> Result<()> {
    let total_size = fs::metadata(file)
        .with_context(|| format!("stat {}", file.display()))?
        .len();
    let parts = plan_parts(total_size, chunk_size)?;
    println!(
        "{}: {} bytes, {} part(s) of up to {} bytes",
        file.display(),
        total_size,
        parts.len(),
        chunk_size
    );
    if parts.len() as u64 > u64::from(S3_MAX_PARTS) {
        println!("warning: more than {} parts; S3 will reject this plan", S3_MAX_PARTS);
    }
    println!("{:>6}  {:>14}  {:>12}  RANGE", "PART", "OFFSET", "LENGTH");
    for p in &parts {
        println!(
            "{:>6}  {:>14}  {:>12}  {}",
            p.part_number,
            p.offset,
            p.length,
            p.span()
        );
    }
    Ok(())
}
