//! CLI for the MPU multipart uploader.

mod args;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mpu_core::config;
use std::path::PathBuf;

pub use args::{parse_size, TuningArgs};
use commands::{run_batch, run_completions, run_plan, run_upload, UploadArgs};

/// Top-level CLI for the MPU multipart uploader.
#[derive(Debug, Parser)]
#[command(name = "mpu")]
#[command(about = "MPU: parallel S3 multipart part uploader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Upload one file in parts to pre-signed part URLs and print the finalize manifest.
    Upload {
        /// File to upload.
        file: PathBuf,
        /// Pre-signed URL for the next part (repeat once per part, in order).
        #[arg(
            long = "url",
            value_name = "URL",
            required_unless_present = "urls_file",
            conflicts_with = "urls_file"
        )]
        urls: Vec<String>,
        /// File with one part URL per line (blank lines and `#` comments ignored).
        #[arg(long, value_name = "PATH")]
        urls_file: Option<PathBuf>,
        #[command(flatten)]
        tuning: TuningArgs,
        /// Cancel the upload if it has not finished after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
        /// Write the CompleteMultipartUpload JSON here instead of stdout.
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Upload several files from a JSON manifest of `{ "path", "urls" }` entries.
    Batch {
        /// Path to the manifest.
        manifest: PathBuf,
        #[command(flatten)]
        tuning: TuningArgs,
        /// Files uploaded at once.
        #[arg(long, value_name = "N")]
        max_concurrent_files: Option<usize>,
        /// Cancel the batch if it has not finished after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
    },

    /// Show how a file would be split into parts (how many URLs to pre-sign).
    Plan {
        /// File to plan.
        file: PathBuf,
        /// Part size in bytes (suffixes K, M, G accepted, binary units).
        #[arg(long, value_name = "SIZE", value_parser = parse_size)]
        chunk_size: Option<u64>,
    },

    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            return run_completions(shell);
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Upload {
                file,
                urls,
                urls_file,
                tuning,
                timeout_secs,
                output,
            } => {
                let args = UploadArgs {
                    file,
                    urls,
                    urls_file,
                    tuning,
                    timeout_secs,
                    output,
                };
                run_upload(&cfg, args).await?
            }
            CliCommand::Batch {
                manifest,
                tuning,
                max_concurrent_files,
                timeout_secs,
            } => run_batch(&cfg, &manifest, &tuning, max_concurrent_files, timeout_secs).await?,
            CliCommand::Plan { file, chunk_size } => {
                run_plan(&file, chunk_size.unwrap_or(cfg.chunk_size_bytes))?
            }
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
