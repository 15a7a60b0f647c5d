//! Projects cleaned text into inference requests.

use std::num::NonZeroUsize;

use labeler_core::inference::InferenceRequest;
use labeler_core::records::{RecordError, RecordSet};

/// One request carrying the cleaned text of every record, in order.
pub fn build(records: &RecordSet, column: &str) -> Result<InferenceRequest, RecordError> {
    let instances = records
        .texts(column)?
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok(InferenceRequest::new(instances))
}

/// Consecutive requests of at most `batch_size` entries.
///
/// `None` yields exactly one request, even for an empty record set. With a
/// batch size, an empty record set yields no requests.
pub fn build_batches(
    records: &RecordSet,
    column: &str,
    batch_size: Option<NonZeroUsize>,
) -> Result<Vec<InferenceRequest>, RecordError> {
    let request = build(records, column)?;
    let Some(size) = batch_size else {
        return Ok(vec![request]);
    };
    Ok(request
        .instances
        .chunks(size.get())
        .map(|chunk| InferenceRequest::new(chunk.to_vec()))
        .collect())
}
