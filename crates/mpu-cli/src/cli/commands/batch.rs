//! `mpu batch` – upload the files listed in a JSON manifest.

use anyhow::{Context, Result};
use mpu_core::config::MpuConfig;
use mpu_core::{CompletedMultipartUpload, FileUpload, HttpTransport, Uploader};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::{cancel_token, parse_targets};
use crate::cli::TuningArgs;

/// One manifest entry: a file and its part URLs in part order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub path: PathBuf,
    pub urls: Vec<String>,
}

/// Output line per uploaded file.
#[derive(Debug, Serialize)]
struct FileResult<'a> {
    path: &'a Path,
    #[serde(flatten)]
    upload: CompletedMultipartUpload,
}

pub fn read_manifest(path: &Path) -> Result<Vec<FileUpload<Url>>> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read manifest {}", path.display()))?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&data)
        .with_context(|| format!("parse manifest {}", path.display()))?;
    entries
        .into_iter()
        .map(|e| {
            let targets = parse_targets(&e.urls)
                .with_context(|| format!("manifest entry {}", e.path.display()))?;
            Ok(FileUpload {
                path: e.path,
                targets,
            })
        })
        .collect()
}

pub async fn run_batch(
    cfg: &MpuConfig,
    manifest: &Path,
    tuning: &TuningArgs,
    max_concurrent_files: Option<usize>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let files = read_manifest(manifest)?;
    let mut upload_cfg = cfg.upload_config();
    tuning.apply(&mut upload_cfg);
    if let Some(n) = max_concurrent_files {
        upload_cfg.max_concurrent_files = n;
    }

    let transport = HttpTransport::new(cfg.http_options()).context("build HTTP client")?;
    let uploader = Uploader::new(transport, upload_cfg);
    let cancel = cancel_token(timeout_secs.map(Duration::from_secs));

    let batch = uploader.upload_files(files, &cancel).await?;
    cancel.cancel();

    for report in &batch.reports {
        let line = FileResult {
            path: &report.path,
            upload: report.completed_multipart_upload(),
        };
        println!("{}", serde_json::to_string(&line)?);
    }
    eprintln!(
        "uploaded {} file(s), {} bytes in {:.2}s",
        batch.files_uploaded(),
        batch.bytes_uploaded(),
        batch.elapsed.as_secs_f64()
    );
    Ok(())
}
