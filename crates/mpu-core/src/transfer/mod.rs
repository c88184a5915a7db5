//! Part transfer: read one part's byte range and send it to its target.
//!
//! The network side sits behind `PartTransport` so the engine can run
//! against the HTTP implementation or an in-memory one in tests.

mod http;
mod source;
mod worker;

use bytes::Bytes;
use std::fmt::Debug;
use std::future::Future;

use crate::retry::TransferError;

pub use http::{HttpOptions, HttpTransport};
pub use source::PartSource;
pub use worker::{transfer_part, PartUpload};

/// Destination for part payloads (e.g. pre-signed PUT URLs).
pub trait PartTransport: Send + Sync + 'static {
    /// Opaque per-part destination.
    type Target: Clone + Debug + Send + Sync + 'static;

    /// Send `body` as part `part_number` to `target`; returns the store's
    /// identifier (ETag) on success. One call is one attempt; no retries here.
    fn put_part(
        &self,
        target: &Self::Target,
        part_number: u32,
        body: Bytes,
    ) -> impl Future<Output = Result<String, TransferError>> + Send;
}
