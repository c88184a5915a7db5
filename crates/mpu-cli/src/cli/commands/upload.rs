//! `mpu upload` – upload one file and emit the CompleteMultipartUpload body.

use anyhow::{Context, Result};
use mpu_core::config::MpuConfig;
use mpu_core::{HttpTransport, Uploader};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use super::{cancel_token, read_targets};
use crate::cli::TuningArgs;

pub struct UploadArgs {
    pub file: PathBuf,
    pub urls: Vec<String>,
    pub urls_file: Option<PathBuf>,
    pub tuning: TuningArgs,
    pub timeout_secs: Option<u64>,
    pub output: Option<PathBuf>,
}

pub async fn run_upload(cfg: &MpuConfig, args: UploadArgs) -> Result<()> {
    let targets = read_targets(&args.urls, args.urls_file.as_deref())?;
    let mut upload_cfg = cfg.upload_config();
    args.tuning.apply(&mut upload_cfg);

    let transport = HttpTransport::new(cfg.http_options()).context("build HTTP client")?;
    let uploader = Uploader::new(transport, upload_cfg);
    let cancel = cancel_token(args.timeout_secs.map(Duration::from_secs));

    let report = uploader.upload_file(&args.file, targets, &cancel).await?;
    cancel.cancel();

    let json = serde_json::to_string_pretty(&report.completed_multipart_upload())?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("write {}", path.display()))?;
        }
        None => println!("{}", json),
    }
    eprintln!(
        "uploaded {} parts ({} bytes) in {:.2}s, {} retries",
        report.parts.len(),
        report.total_size,
        report.elapsed.as_secs_f64(),
        report.stats.retries
    );
    Ok(())
}
