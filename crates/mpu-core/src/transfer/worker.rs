//! One attempt of one part: read its range, send it, return its identifier.

use std::sync::Arc;

use crate::aggregate::PartResult;
use crate::coordinator::Worker;
use crate::planner::{PartSpec, UploadPlan};
use crate::retry::{classify, ErrorKind, TransferError};

use super::{PartSource, PartTransport};

/// Uploads a single part: one positional read of its byte range, one call
/// to the transport. Stateless, so re-invoking it for a retry is safe.
pub async fn transfer_part<T: PartTransport>(
    source: &PartSource,
    transport: &T,
    spec: &PartSpec<T::Target>,
) -> Result<PartResult, TransferError> {
    let body = source.read_range(&spec.range).await.map_err(TransferError::Read)?;
    let etag = transport.put_part(&spec.target, spec.part_number(), body).await?;
    Ok(PartResult {
        part_number: spec.part_number(),
        etag,
    })
}

/// Worker over the parts of one file's plan; unit N is part number N.
pub struct PartUpload<T: PartTransport> {
    source: PartSource,
    transport: Arc<T>,
    plan: UploadPlan<T::Target>,
}

impl<T: PartTransport> PartUpload<T> {
    pub fn new(source: PartSource, transport: Arc<T>, plan: UploadPlan<T::Target>) -> Self {
        Self {
            source,
            transport,
            plan,
        }
    }

    pub fn plan(&self) -> &UploadPlan<T::Target> {
        &self.plan
    }
}

impl<T: PartTransport> Worker for PartUpload<T> {
    type Output = PartResult;
    type Error = TransferError;

    async fn attempt(&self, unit: u32, attempt: u32) -> Result<PartResult, TransferError> {
        let spec = self
            .plan
            .part(unit)
            .ok_or(TransferError::NoSuchPart { part_number: unit })?;
        tracing::trace!(part_number = unit, attempt, range = %spec.range.span(), "sending part");
        transfer_part(&self.source, self.transport.as_ref(), spec).await
    }

    fn classify(&self, error: &TransferError) -> ErrorKind {
        classify(error)
    }
}
