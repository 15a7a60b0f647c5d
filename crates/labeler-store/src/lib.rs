//! Storage layer: local Parquet files in, local Parquet files out.

mod error;
pub use error::StoreError;

#[cfg(feature = "parquet")]
mod parquet;
#[cfg(feature = "parquet")]
pub use self::parquet::{read_parquet, read_records, write_parquet};
