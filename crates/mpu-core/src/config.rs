use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transfer::HttpOptions;
use crate::upload::{
    UploadConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CONCURRENT_FILES, DEFAULT_MAX_CONCURRENT_PARTS,
    DEFAULT_MAX_RETRIES_PER_PART, DEFAULT_PARALLEL_FAILURE_BUDGET,
};

/// Backoff delays between part retries (optional `[retry]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Delay before the first retry; doubles per further retry.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 300,
            max_delay_ms: 10_000,
        }
    }
}

/// HTTP client timeouts (optional `[http]` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    /// Whole-request timeout per part; 0 disables it.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            request_timeout_secs: 3600,
        }
    }
}

/// Global configuration loaded from `~/.config/mpu/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpuConfig {
    /// Bytes per part.
    pub chunk_size_bytes: u64,
    /// Part attempts in flight per file.
    pub max_concurrent_parts: usize,
    /// Parts allowed to be failing at once before an upload aborts.
    pub parallel_failure_budget: usize,
    /// Retries per part after its first attempt.
    pub max_retries_per_part: u32,
    /// Files uploaded at once by `mpu batch`.
    pub max_concurrent_files: usize,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    #[serde(default)]
    pub http: Option<HttpConfig>,
}

impl Default for MpuConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            max_concurrent_parts: DEFAULT_MAX_CONCURRENT_PARTS,
            parallel_failure_budget: DEFAULT_PARALLEL_FAILURE_BUDGET,
            max_retries_per_part: DEFAULT_MAX_RETRIES_PER_PART,
            max_concurrent_files: DEFAULT_MAX_CONCURRENT_FILES,
            retry: None,
            http: None,
        }
    }
}

impl MpuConfig {
    /// Engine settings; a missing `[retry]` table means built-in delays.
    pub fn upload_config(&self) -> UploadConfig {
        let retry = self.retry.clone().unwrap_or_default();
        UploadConfig {
            chunk_size: self.chunk_size_bytes,
            max_concurrent_parts: self.max_concurrent_parts,
            parallel_failure_budget: self.parallel_failure_budget,
            max_retries_per_part: self.max_retries_per_part,
            max_concurrent_files: self.max_concurrent_files,
            retry_base_delay: Duration::from_millis(retry.base_delay_ms),
            retry_max_delay: Duration::from_millis(retry.max_delay_ms),
        }
    }

    pub fn http_options(&self) -> HttpOptions {
        let http = self.http.clone().unwrap_or_default();
        HttpOptions {
            connect_timeout: Duration::from_secs(http.connect_timeout_secs),
            request_timeout: (http.request_timeout_secs > 0)
                .then(|| Duration::from_secs(http.request_timeout_secs)),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mpu")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MpuConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as `load_or_init` for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<MpuConfig> {
    if !path.exists() {
        let default_cfg = MpuConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: MpuConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = MpuConfig::default();
        assert_eq!(cfg.chunk_size_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.max_concurrent_parts, 128);
        assert_eq!(cfg.parallel_failure_budget, 63);
        assert_eq!(cfg.max_retries_per_part, 1);
        assert_eq!(cfg.max_concurrent_files, 4);
        assert_eq!(cfg.upload_config(), UploadConfig::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = MpuConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: MpuConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            chunk_size_bytes = 5_242_880
            max_concurrent_parts = 16
            parallel_failure_budget = 4
            max_retries_per_part = 3
            max_concurrent_files = 2

            [retry]
            base_delay_ms = 100
            max_delay_ms = 2000

            [http]
            connect_timeout_secs = 5
            request_timeout_secs = 0
        "#;
        let cfg: MpuConfig = toml::from_str(toml).unwrap();
        let upload = cfg.upload_config();
        assert_eq!(upload.chunk_size, 5 * 1024 * 1024);
        assert_eq!(upload.max_concurrent_parts, 16);
        assert_eq!(upload.parallel_failure_budget, 4);
        assert_eq!(upload.max_retries_per_part, 3);
        assert_eq!(upload.retry_base_delay, Duration::from_millis(100));
        assert_eq!(upload.retry_max_delay, Duration::from_secs(2));

        let http = cfg.http_options();
        assert_eq!(http.connect_timeout, Duration::from_secs(5));
        assert_eq!(http.request_timeout, None);
    }

    #[test]
    fn missing_tables_use_defaults() {
        let toml = r#"
            chunk_size_bytes = 1024
            max_concurrent_parts = 8
            parallel_failure_budget = 1
            max_retries_per_part = 0
            max_concurrent_files = 1
        "#;
        let cfg: MpuConfig = toml::from_str(toml).unwrap();
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.http_options(), HttpOptions::default());
        assert_eq!(cfg.upload_config().retry_base_delay, Duration::from_millis(300));
    }

    #[test]
    fn load_or_init_writes_default_then_reads_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let created = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        let loaded = load_or_init_at(&path).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "chunk_size_bytes = \"big\"").unwrap();
        assert!(load_or_init_at(&path).is_err());
    }
}
