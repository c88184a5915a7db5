pub mod config;
pub mod logging;

pub mod aggregate;
pub mod coordinator;
pub mod error;
pub mod planner;
pub mod retry;
pub mod transfer;
pub mod upload;

pub use aggregate::{CompletedMultipartUpload, PartResult};
pub use error::UploadError;
pub use transfer::{HttpOptions, HttpTransport, PartTransport};
pub use upload::{BatchReport, FileUpload, UploadConfig, UploadReport, Uploader};
