//! Predicted label post-processing: canonical label names and positional
//! merge of predictions onto the input records.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use labeler_core::inference::InferenceResult;
use labeler_core::records::{RecordError, RecordSet};
use labeler_core::schema::predicted;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("alignment fault: {actual} predictions for {expected} records")]
pub struct AlignmentError {
    pub expected: usize,
    pub actual: usize,
}

impl AlignmentError {
    /// `Ok` when the counts agree.
    pub fn check(expected: usize, actual: usize) -> Result<(), Self> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self { expected, actual })
        }
    }
}

#[derive(Error, Debug)]
pub enum MergeError {
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error("attach prediction columns: {0}")]
    Record(#[from] RecordError),
}

/// Turn a raw model label into a display name.
///
/// `__label__office_supplies` with prefix `__label__` becomes `Office Supplies`.
pub fn canonicalize(label: &str, prefix: &str) -> String {
    let stripped = if prefix.is_empty() {
        label.to_string()
    } else {
        label.replace(prefix, "")
    };
    title_case(&stripped.replace('_', " "))
}

/// Upper-case the first cased character of each run, lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for c in text.chars() {
        if previous_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_cased = c.is_lowercase() || c.is_uppercase();
    }
    out
}

/// Append canonical `label` and `prob` columns, pairing `results[i]` with record `i`.
///
/// Existing `label`/`prob` columns are replaced. Fails without output when the
/// counts differ.
pub fn merge(
    records: &RecordSet,
    results: &[InferenceResult],
    prefix: &str,
) -> Result<RecordSet, MergeError> {
    AlignmentError::check(records.len(), results.len())?;

    let labels: Vec<String> = results
        .iter()
        .map(|r| canonicalize(&r.label, prefix))
        .collect();
    let probs: Vec<f64> = results.iter().map(|r| r.probability).collect();

    let base = records
        .without_column(predicted::LABEL_COLUMN)?
        .without_column(predicted::PROB_COLUMN)?;
    let label_array: ArrayRef = Arc::new(StringArray::from(labels));
    let prob_array: ArrayRef = Arc::new(Float64Array::from(probs));

    let out = base
        .with_column(predicted::label_field(), label_array)?
        .with_column(predicted::prob_field(), prob_array)?;
    debug!(rows = out.len(), "merged predictions");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Int64Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use labeler_core::config::DEFAULT_LABEL_PREFIX;

    fn result(label: &str, probability: f64) -> InferenceResult {
        InferenceResult {
            label: label.into(),
            probability,
        }
    }

    fn records(n: i64) -> RecordSet {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64, false)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Int64Array::from((0..n).collect::<Vec<_>>()))],
        )
        .unwrap();
        RecordSet::new(batch)
    }

    #[test]
    fn canonical_names() {
        assert_eq!(
            canonicalize("__label__office_supplies", DEFAULT_LABEL_PREFIX),
            "Office Supplies"
        );
        assert_eq!(canonicalize("__label__a_b_c", DEFAULT_LABEL_PREFIX), "A B C");
        assert_eq!(canonicalize("__label__IT_HARDWARE", DEFAULT_LABEL_PREFIX), "It Hardware");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize("__label__office_supplies", DEFAULT_LABEL_PREFIX);
        assert_eq!(canonicalize(&once, DEFAULT_LABEL_PREFIX), once);
    }

    #[test]
    fn custom_and_empty_prefix() {
        assert_eq!(canonicalize("cat:desk_lamp", "cat:"), "Desk Lamp");
        assert_eq!(canonicalize("desk_lamp", ""), "Desk Lamp");
    }

    #[test]
    fn title_case_follows_letter_runs() {
        assert_eq!(title_case("they're bill's 2nd"), "They'Re Bill'S 2Nd");
        assert_eq!(title_case("hELLO wORLD"), "Hello World");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn merge_appends_in_order() {
        let out = merge(
            &records(2),
            &[result("__label__furniture", 0.8), result("__label__office_supplies", 0.6)],
            DEFAULT_LABEL_PREFIX,
        )
        .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.texts("label").unwrap(), vec!["Furniture", "Office Supplies"]);
        let probs = out
            .batch()
            .column(2)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(probs.value(0), 0.8);
        assert_eq!(probs.value(1), 0.6);
    }

    #[test]
    fn merge_rejects_count_mismatch() {
        let err = merge(&records(3), &[result("__label__a", 0.5)], "").unwrap_err();
        match err {
            MergeError::Alignment(a) => {
                assert_eq!(a, AlignmentError { expected: 3, actual: 1 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(merge(&records(1), &[], "").is_err());
    }

    #[test]
    fn merge_replaces_existing_prediction_columns() {
        let first = merge(&records(1), &[result("__label__old", 0.1)], "__label__").unwrap();
        let second = merge(&first, &[result("__label__new", 0.9)], "__label__").unwrap();
        assert_eq!(second.schema().fields().len(), 3);
        assert_eq!(second.texts("label").unwrap(), vec!["New"]);
        assert_eq!(second.batch().column(2).len(), 1);
    }

    #[test]
    fn merge_empty() {
        let out = merge(&records(0), &[], DEFAULT_LABEL_PREFIX).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.schema().fields().len(), 3);
    }
}
