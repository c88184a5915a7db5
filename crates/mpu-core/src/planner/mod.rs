//! Range math and part planning.
//!
//! Splits a file into fixed-size chunks, one per multipart part number, and
//! pairs each chunk with the transfer target the caller pre-authorized for it.

mod plan;
mod range;

pub use plan::{PartSpec, UploadPlan};
pub use range::{part_count, plan_parts, PartRange, PlanError, S3_MAX_PARTS};
