//! Ordered record set backed by a single Arrow `RecordBatch`.
//!
//! Row order is the only key that ties a record to its cleaned text and its
//! prediction, so every operation here preserves it.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, LargeStringArray, StringArray, StringViewArray};
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("input has no record batches")]
    NoBatches,
    #[error("missing '{name}' column (available: {})", available.join(", "))]
    MissingColumn { name: String, available: Vec<String> },
    #[error("column '{name}' is {data_type}, expected a string column")]
    NotText { name: String, data_type: String },
    #[error("column '{name}' has {actual} rows, record set has {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Records for one pipeline run, in input order.
#[derive(Debug, Clone)]
pub struct RecordSet {
    batch: RecordBatch,
}

impl RecordSet {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Concatenate batches (e.g. Parquet row groups) into one record set.
    pub fn from_batches(batches: &[RecordBatch]) -> Result<Self, RecordError> {
        let first = batches.first().ok_or(RecordError::NoBatches)?;
        if batches.len() == 1 {
            return Ok(Self::new(first.clone()));
        }
        let batch = arrow::compute::concat_batches(&first.schema(), batches)?;
        debug!(
            batches = batches.len(),
            rows = batch.num_rows(),
            "concatenated record batches"
        );
        Ok(Self { batch })
    }

    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// Resolve a column by exact name, falling back to a case-insensitive match.
    pub fn column_index(&self, name: &str) -> Result<usize, RecordError> {
        let schema = self.batch.schema();
        if let Ok(idx) = schema.index_of(name) {
            return Ok(idx);
        }
        schema
            .fields()
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| RecordError::MissingColumn {
                name: name.to_string(),
                available: schema.fields().iter().map(|f| f.name().clone()).collect(),
            })
    }

    /// Text values of a string column, one per record. Nulls read as `""`.
    pub fn texts(&self, name: &str) -> Result<Vec<&str>, RecordError> {
        let idx = self.column_index(name)?;
        let col = self.batch.column(idx);
        let field = self.batch.schema_ref().field(idx);
        let n = col.len();

        if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
            Ok((0..n).map(|i| text_at(arr, i, arr.value(i))).collect())
        } else if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
            Ok((0..n).map(|i| text_at(arr, i, arr.value(i))).collect())
        } else if let Some(arr) = col.as_any().downcast_ref::<StringViewArray>() {
            Ok((0..n).map(|i| text_at(arr, i, arr.value(i))).collect())
        } else {
            Err(RecordError::NotText {
                name: field.name().clone(),
                data_type: field.data_type().to_string(),
            })
        }
    }

    /// Return a new record set with `array` appended as the last column.
    pub fn with_column(&self, field: Field, array: ArrayRef) -> Result<Self, RecordError> {
        if array.len() != self.len() {
            return Err(RecordError::LengthMismatch {
                name: field.name().clone(),
                expected: self.len(),
                actual: array.len(),
            });
        }

        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        fields.push(field);
        let schema = Schema::new_with_metadata(fields, schema.metadata().clone());

        // Cheap Arc clones of the existing columns.
        let mut columns: Vec<ArrayRef> = self.batch.columns().to_vec();
        columns.push(array);

        Ok(Self::new(RecordBatch::try_new(Arc::new(schema), columns)?))
    }

    /// Return a new record set without the named column. Absent columns are a no-op.
    pub fn without_column(&self, name: &str) -> Result<Self, RecordError> {
        let schema = self.batch.schema();
        let keep: Vec<usize> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.name() != name)
            .map(|(i, _)| i)
            .collect();
        if keep.len() == schema.fields().len() {
            return Ok(self.clone());
        }
        Ok(Self::new(self.batch.project(&keep)?))
    }
}

fn text_at<'a>(arr: &dyn Array, row: usize, value: &'a str) -> &'a str {
    if arr.is_null(row) { "" } else { value }
}
