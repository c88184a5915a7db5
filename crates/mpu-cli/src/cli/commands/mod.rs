//! CLI command handlers, one file per command.

mod batch;
mod cancel;
mod completions;
mod plan;
mod targets;
mod upload;

pub use batch::{read_manifest, run_batch};
pub use cancel::cancel_token;
pub use completions::run_completions;
pub use plan::run_plan;
pub use targets::{parse_targets, read_targets};
pub use upload::{run_upload, UploadArgs};
