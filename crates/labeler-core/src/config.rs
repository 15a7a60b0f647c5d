//! Pipeline configuration shared by the library crates and the CLI.

use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::predicted;

/// Label prefix emitted by fastText-style models.
pub const DEFAULT_LABEL_PREFIX: &str = "__label__";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Knobs for one pipeline run. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input column holding the free text.
    pub text_column: String,
    /// Name of the attached cleaned-text column.
    pub cleaned_column: String,
    /// Removed from every predicted label before canonicalization.
    pub label_prefix: String,
    /// Maximum instances per request. `None` sends the whole dataset at once.
    pub batch_size: Option<NonZeroUsize>,
    /// Keep the cleaned-text column in the output.
    pub keep_cleaned: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_column: predicted::TEXT_COLUMN.to_string(),
            cleaned_column: predicted::CLEANED_COLUMN.to_string(),
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
            batch_size: None,
            keep_cleaned: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
