mod response;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hotelmerge_fetch::{FetchConfig, ImageFetcher};
use hotelmerge_pipeline::{BatchProcessor, BatchResult, InputDocument, PipelineConfig};
use hotelmerge_store::FsOutputSink;

use crate::response::Response;

#[derive(Parser)]
#[command(name = "hotelmerge", version, about = "Merge GIATA/COAH hotel documents and collect verified images")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge hotel documents into `<output-dir>/<timestamp>/hotels.json` and download their images.
    Convert(ConvertArgs),
}

#[derive(Args)]
struct ConvertArgs {
    /// Documents named `<hotel id>-...-giata.<json|xml>` or `<hotel id>-...-coah.<json|xml>`.
    files: Vec<PathBuf>,

    /// Base directory for run output.
    #[arg(long, env = "HOTELMERGE_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Per-image request timeout.
    #[arg(long, default_value_t = 30)]
    fetch_timeout_secs: u64,

    #[arg(long, default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Budget for all image downloads of the batch.
    #[arg(long, default_value_t = 300)]
    deadline_secs: u64,

    #[arg(long, default_value_t = 16)]
    max_concurrent_fetches: usize,
}

impl ConvertArgs {
    fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            request_timeout: Duration::from_secs(self.fetch_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..FetchConfig::default()
        }
    }

    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            deadline: Duration::from_secs(self.deadline_secs),
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    tracing::info!("hotelmerge v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Convert(args) => {
            let response = Response::from_outcome(convert(&args).await);
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

async fn convert(args: &ConvertArgs) -> anyhow::Result<BatchResult> {
    let documents = read_documents(&args.files).await?;
    let fetcher = ImageFetcher::new(&args.fetch_config()).context("building HTTP client")?;
    let processor = BatchProcessor::new(
        FsOutputSink::new(&args.output_dir),
        fetcher,
        args.pipeline_config(),
    );
    Ok(processor.process(&documents).await?)
}

/// Load each file as an upload named after its base name.
async fn read_documents(paths: &[PathBuf]) -> anyhow::Result<Vec<InputDocument>> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        documents.push(InputDocument::new(upload_name(path), content));
    }
    Ok(documents)
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
