//! Classification run: read Parquet → normalize → invoke endpoint → write Parquet.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use arrow::util::pretty::pretty_format_batches;
use clap::Args;
use labeler_ai::{Normalizer, Pipeline};
use labeler_core::PipelineConfig;
use labeler_core::records::RecordSet;
use labeler_core::schema::predicted;
use labeler_endpoint::EndpointClient;

const PREVIEW_ROWS: usize = 5;

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    /// Input Parquet file with a free-text column
    #[arg(short, long)]
    pub input: PathBuf,
    /// Output Parquet file (original columns plus label and prob)
    #[arg(short, long)]
    pub output: PathBuf,
    /// Model invocation URL
    #[arg(long, env = "LABELER_ENDPOINT")]
    pub endpoint: String,
    /// Bearer token sent with every call
    #[arg(long, env = "LABELER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
    /// JSON pipeline config; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Column holding the text to classify [default: description]
    #[arg(long)]
    pub text_column: Option<String>,
    /// Prefix stripped from predicted labels [default: __label__]
    #[arg(long)]
    pub label_prefix: Option<String>,
    /// Maximum records per request (default: all records in one request)
    #[arg(long)]
    pub batch_size: Option<NonZeroUsize>,
    /// Directory with lexicon.json and/or tokenizer.json
    #[arg(long, env = "LABELER_RESOURCES")]
    pub resources: Option<PathBuf>,
    /// Keep the cleaned-text column in the output
    #[arg(long)]
    pub keep_cleaned: bool,
}

impl ClassifyArgs {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(column) = &self.text_column {
            config.text_column = column.clone();
        }
        if let Some(prefix) = &self.label_prefix {
            config.label_prefix = prefix.clone();
        }
        if self.batch_size.is_some() {
            config.batch_size = self.batch_size;
        }
        if self.keep_cleaned {
            config.keep_cleaned = true;
        }
        Ok(config)
    }
}

#[derive(Debug)]
pub struct ClassifyStats {
    pub total_rows: usize,
    pub elapsed_secs: f64,
}

pub fn load_normalizer(resources: Option<&Path>) -> anyhow::Result<Normalizer> {
    match resources {
        Some(dir) => Normalizer::load(dir)
            .with_context(|| format!("loading normalizer resources from {}", dir.display())),
        None => Ok(Normalizer::english()),
    }
}

/// Run the full classification pipeline for one input file.
pub async fn run_classify(args: &ClassifyArgs) -> anyhow::Result<ClassifyStats> {
    let start = Instant::now();

    // 1. Resources first, so a bad lexicon fails before any I/O.
    let config = args.pipeline_config()?;
    let normalizer = load_normalizer(args.resources.as_deref())?;

    // 2. Read source Parquet.
    let records = labeler_store::read_records(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let total_rows = records.len();
    eprintln!("  Read {total_rows} rows from {}", args.input.display());

    // 3. Classify.
    let mut client = EndpointClient::new(args.endpoint.clone());
    if let Some(token) = &args.token {
        client = client.with_token(token.clone());
    }
    match config.batch_size {
        Some(size) => eprintln!(
            "  Classifying via {} in batches of {size}...",
            client.url()
        ),
        None => eprintln!("  Classifying via {}...", client.url()),
    }
    let pipeline = Pipeline::new(normalizer, config);
    let predicted = pipeline
        .run(&records, &client)
        .await
        .context("classifying records")?;

    // 4. Write output.
    labeler_store::write_parquet(&args.output, &predicted)
        .with_context(|| format!("writing {}", args.output.display()))?;
    eprintln!("  Wrote {} rows to {}", predicted.len(), args.output.display());

    if let Some(preview) = preview(&predicted)? {
        eprintln!("{preview}");
    }

    Ok(ClassifyStats {
        total_rows,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// First few predicted rows, label and probability only.
fn preview(records: &RecordSet) -> anyhow::Result<Option<String>> {
    if records.is_empty() {
        return Ok(None);
    }
    let schema = records.schema();
    let columns = [
        schema.index_of(predicted::LABEL_COLUMN)?,
        schema.index_of(predicted::PROB_COLUMN)?,
    ];
    let head = records
        .batch()
        .slice(0, records.len().min(PREVIEW_ROWS))
        .project(&columns)?;
    Ok(Some(pretty_format_batches(&[head])?.to_string()))
}
