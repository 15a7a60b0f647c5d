mod classify;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use classify::ClassifyArgs;

#[derive(Parser)]
#[command(
    name = "labeler",
    version,
    about = "Batch text classification against a hosted model"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every record of a Parquet file and write the predictions
    Classify(ClassifyArgs),
    /// Print the cleaned form of each text
    Normalize {
        /// Directory with lexicon.json and/or tokenizer.json
        #[arg(long, env = "LABELER_RESOURCES")]
        resources: Option<PathBuf>,
        /// Texts to normalize
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("labeler v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Commands::Classify(args) => {
            let stats = classify::run_classify(&args).await?;
            eprintln!(
                "Done: {} rows classified in {:.1}s.",
                stats.total_rows, stats.elapsed_secs
            );
        }
        Commands::Normalize { resources, texts } => {
            let normalizer = classify::load_normalizer(resources.as_deref())?;
            for text in &texts {
                println!("{}", normalizer.normalize(text));
            }
        }
    }
    Ok(())
}
