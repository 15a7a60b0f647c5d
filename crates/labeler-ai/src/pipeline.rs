//! The classification chain: normalize, build requests, invoke, parse, merge.

use labeler_core::config::PipelineConfig;
use labeler_core::inference::{InferenceResult, Invoker, ResponseError, parse_response};
use labeler_core::records::{RecordError, RecordSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::labels::{self, AlignmentError, MergeError};
use crate::lexicon::LexiconError;
use crate::normalizer::{Normalizer, attach_cleaned};
use crate::payload;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("resource initialization failed: {0}")]
    Resource(#[from] LexiconError),
    #[error("input records: {0}")]
    Input(#[from] RecordError),
    #[error("batch {batch}: inference call failed: {source}")]
    Transport {
        batch: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("batch {batch}: malformed response: {source}")]
    Response {
        batch: usize,
        #[source]
        source: ResponseError,
    },
    #[error("{}{source}", .batch.map(|b| format!("batch {b}: ")).unwrap_or_default())]
    Alignment {
        batch: Option<usize>,
        #[source]
        source: AlignmentError,
    },
    #[error("build output: {0}")]
    Merge(RecordError),
}

impl From<MergeError> for PipelineError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::Alignment(source) => Self::Alignment {
                batch: None,
                source,
            },
            MergeError::Record(e) => Self::Merge(e),
        }
    }
}

/// One configured classification run over an in-memory record set.
pub struct Pipeline {
    normalizer: Normalizer,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(normalizer: Normalizer, config: PipelineConfig) -> Self {
        Self { normalizer, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Classify every record and return them with `label` and `prob` appended.
    ///
    /// Batches are sent one after another; the first failure aborts the run
    /// and nothing is returned. An empty record set is not sent: the output
    /// then has the input columns plus empty `label` and `prob` columns.
    pub async fn run<I>(&self, records: &RecordSet, invoker: &I) -> Result<RecordSet, PipelineError>
    where
        I: Invoker + ?Sized,
    {
        let cfg = &self.config;
        info!(rows = records.len(), column = %cfg.text_column, "classifying records");

        let cleaned = self.normalizer.normalize_column(records, &cfg.text_column)?;
        let base = records.without_column(&cfg.cleaned_column)?;
        let with_cleaned = attach_cleaned(&base, cleaned, &cfg.cleaned_column)?;

        let results = if with_cleaned.is_empty() {
            info!("no records, skipping inference");
            Vec::new()
        } else {
            self.infer(&with_cleaned, invoker).await?
        };

        let output = if cfg.keep_cleaned { &with_cleaned } else { &base };
        let predicted = labels::merge(output, &results, &cfg.label_prefix)?;
        info!(rows = predicted.len(), "classification complete");
        Ok(predicted)
    }

    async fn infer<I>(
        &self,
        records: &RecordSet,
        invoker: &I,
    ) -> Result<Vec<InferenceResult>, PipelineError>
    where
        I: Invoker + ?Sized,
    {
        let cfg = &self.config;
        let requests = payload::build_batches(records, &cfg.cleaned_column, cfg.batch_size)?;
        let batches = requests.len();
        let mut results = Vec::with_capacity(records.len());

        for (batch, request) in requests.iter().enumerate() {
            debug!(batch, batches, instances = request.len(), "invoking endpoint");
            let raw = invoker
                .invoke(request)
                .await
                .map_err(|e| PipelineError::Transport {
                    batch,
                    source: Box::new(e),
                })?;
            let parsed =
                parse_response(&raw).map_err(|source| PipelineError::Response { batch, source })?;

            if cfg.batch_size.is_some() {
                AlignmentError::check(request.len(), parsed.len()).map_err(|source| {
                    PipelineError::Alignment {
                        batch: Some(batch),
                        source,
                    }
                })?;
            }
            results.extend(parsed);
        }
        Ok(results)
    }
}
