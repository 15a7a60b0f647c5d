/// Column names and Arrow fields for predicted records.
pub mod predicted {
    use arrow::datatypes::{DataType, Field};

    /// Free-text column read from the input file.
    pub const TEXT_COLUMN: &str = "description";
    /// Normalized text attached positionally to each record.
    pub const CLEANED_COLUMN: &str = "processed_desc";
    /// Canonicalized category name.
    pub const LABEL_COLUMN: &str = "label";
    /// Probability of the top-ranked label.
    pub const PROB_COLUMN: &str = "prob";

    /// Field for the cleaned-text column.
    pub fn cleaned_field(name: &str) -> Field {
        Field::new(name, DataType::Utf8, false)
    }

    pub fn label_field() -> Field {
        Field::new(LABEL_COLUMN, DataType::Utf8, false)
    }

    pub fn prob_field() -> Field {
        Field::new(PROB_COLUMN, DataType::Float64, false)
    }
}
