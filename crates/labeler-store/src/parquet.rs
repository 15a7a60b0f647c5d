//! Parquet file I/O for record sets.

use std::fs::File;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use labeler_core::records::RecordSet;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::info;

use crate::StoreError;

/// Read every row group of a Parquet file as Arrow batches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    let file = open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

/// Read a Parquet file into one record set. A file with no rows yields an
/// empty record set that keeps the file's schema.
pub fn read_records(path: &Path) -> Result<RecordSet, StoreError> {
    let file = open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches: Vec<RecordBatch> = builder.build()?.collect::<Result<_, _>>()?;

    let records = if batches.is_empty() {
        RecordSet::new(RecordBatch::new_empty(schema))
    } else {
        RecordSet::from_batches(&batches)?
    };
    info!(path = %path.display(), rows = records.len(), "read records");
    Ok(records)
}

/// Write a record set to a Parquet file, replacing any existing file.
pub fn write_parquet(path: &Path, records: &RecordSet) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, records.schema(), Some(props))?;
    writer.write(records.batch())?;
    writer.close()?;

    info!(path = %path.display(), rows = records.len(), "wrote records");
    Ok(())
}

fn open(path: &Path) -> Result<File, StoreError> {
    if !path.exists() {
        return Err(StoreError::ParquetNotFound(path.to_path_buf()));
    }
    Ok(File::open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use tempfile::TempDir;

    fn predicted() -> RecordSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("description", DataType::Utf8, true),
            Field::new("label", DataType::Utf8, false),
            Field::new("prob", DataType::Float64, false),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![1, 2, 3])),
                Arc::new(StringArray::from(vec![
                    Some("Printer out of toner"),
                    None,
                    Some("Desk wobbles"),
                ])),
                Arc::new(StringArray::from(vec!["Office Supplies", "Misc", "Furniture"])),
                Arc::new(Float64Array::from(vec![0.91, 0.4, 0.77])),
            ],
        )
        .unwrap();
        RecordSet::new(batch)
    }

    #[test]
    fn written_file_reads_back_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out").join("predicted.parquet");
        let records = predicted();

        write_parquet(&path, &records).unwrap();
        let back = read_records(&path).unwrap();

        assert_eq!(back.len(), 3);
        assert_eq!(back.schema().fields().len(), 4);
        assert_eq!(
            back.texts("label").unwrap(),
            vec!["Office Supplies", "Misc", "Furniture"]
        );
        assert_eq!(
            back.texts("description").unwrap(),
            vec!["Printer out of toner", "", "Desk wobbles"]
        );
    }

    #[test]
    fn empty_file_keeps_schema() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.parquet");
        let schema = Arc::new(Schema::new(vec![Field::new(
            "description",
            DataType::Utf8,
            true,
        )]));
        write_parquet(&path, &RecordSet::new(RecordBatch::new_empty(schema))).unwrap();

        let back = read_records(&path).unwrap();
        assert!(back.is_empty());
        assert_eq!(back.schema().field(0).name(), "description");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = read_records(Path::new("/nonexistent/input.parquet")).unwrap_err();
        assert!(matches!(err, StoreError::ParquetNotFound(_)));
    }

    #[test]
    fn garbage_file_is_parquet_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.parquet");
        std::fs::write(&path, b"not a parquet file").unwrap();
        assert!(matches!(read_parquet(&path), Err(StoreError::Parquet(_))));
    }
}
