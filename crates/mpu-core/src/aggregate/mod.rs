//! Result aggregation: per-unit completion tracking and ordered emission of
//! part identifiers for the finalize call.

mod bitmap;
mod collect;

pub use bitmap::PartBitmap;
pub use collect::{Aggregator, CompletedMultipartUpload, ConsistencyError, PartResult};
