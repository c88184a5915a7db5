use mpu_core::logging;
use mpu_core::UploadError;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // The file log is best effort; stderr keeps the CLI usable on read-only homes.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("mpu error: {:#}", err);
        let cancelled = err
            .downcast_ref::<UploadError>()
            .is_some_and(UploadError::is_cancelled);
        std::process::exit(if cancelled { 130 } else { 1 });
    }
}
