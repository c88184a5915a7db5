//! Part transfer error type for retry classification.

use thiserror::Error;

/// Error returned by a single part transfer attempt (transport failure, HTTP
/// error, or local read failure). Kept separate from `UploadError` so the
/// coordinator can classify and decide retries before anything surfaces.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The HTTP client reported an error (timeout, connection reset, etc.).
    #[error("transport: {0}")]
    Transport(#[source] reqwest::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u16 },
    /// Reading the part's byte range from the local file failed. Not retried.
    #[error("read: {0}")]
    Read(#[source] std::io::Error),
    /// The store accepted the part but returned no ETag, so it cannot be finalized.
    #[error("HTTP {status} response carried no ETag")]
    MissingIdentifier { status: u16 },
    /// ETag header was present but not valid ASCII.
    #[error("ETag header is not valid ASCII")]
    InvalidIdentifier,
    /// The plan has no part with this number.
    #[error("no part {part_number} in the upload plan")]
    NoSuchPart { part_number: u32 },
}
