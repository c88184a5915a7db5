//! Part URLs from flags or a file.

use anyhow::{Context, Result};
use mpu_core::UploadError;
use std::fs;
use std::path::Path;
use url::Url;

/// Parse part URLs in order. Malformed or non-http(s) URLs are `InvalidInput`,
/// reported before any upload starts.
pub fn parse_targets<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Url>, UploadError> {
    raw.iter()
        .enumerate()
        .map(|(i, s)| {
            let url = Url::parse(s.as_ref().trim()).map_err(|e| {
                UploadError::InvalidInput(format!("invalid URL for part {}: {}", i + 1, e))
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(UploadError::InvalidInput(format!(
                    "part {} URL must be http or https, got {}",
                    i + 1,
                    url.scheme()
                )));
            }
            Ok(url)
        })
        .collect()
}

/// URLs from `--url` flags, or one per line of `urls_file`.
pub fn read_targets(urls: &[String], urls_file: Option<&Path>) -> Result<Vec<Url>> {
    let Some(path) = urls_file else {
        return Ok(parse_targets(urls)?);
    };
    let data =
        fs::read_to_string(path).with_context(|| format!("read URL file {}", path.display()))?;
    let lines: Vec<&str> = data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect();
    Ok(parse_targets(&lines)?)
}
