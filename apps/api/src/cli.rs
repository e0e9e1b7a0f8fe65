//! Command-line surface: run the HTTP service, or use the intake and matching
//! pipelines directly against local files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::intake::{parse_resume, IntakeError, ProfileBuilder, TextExtractor};
use crate::matching::{run_rank, HashingEmbedder, JobCorpus, RankRequest};

/// Exit code for a document no stage could read.
pub const EXIT_EXTRACTION: u8 = 2;
/// Exit code for an oracle that answered with schema-incoherent output.
pub const EXIT_VALIDATION: u8 = 3;

#[derive(Debug, Parser)]
#[command(name = "credx", version, about = "Resume intake and job ranking service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve,
    /// Parse a resume PDF and print the profile JSON.
    Parse(ParseArgs),
    /// Rank the corpus for a request JSON file and print the results.
    Rank(RankArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ParseArgs {
    /// Path to the resume PDF.
    pub path: PathBuf,

    /// Write the profile here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Oracle credential; overrides CREDX_ORACLE_API_KEY.
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct RankArgs {
    /// Ranking request JSON.
    #[arg(long)]
    pub request: PathBuf,

    /// Corpus JSON; defaults to CREDX_CORPUS_PATH.
    #[arg(long)]
    pub corpus: Option<PathBuf>,
}

/// Maps a failed command to its process exit code.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<IntakeError>() {
        Some(IntakeError::Extraction(_)) | Some(IntakeError::EmptyText) => EXIT_EXTRACTION,
        Some(IntakeError::Validation(_)) => EXIT_VALIDATION,
        None => 1,
    }
}

pub async fn run_parse(args: &ParseArgs, config: &Config) -> Result<()> {
    let document = tokio::fs::read(&args.path)
        .await
        .with_context(|| format!("Failed to read {}", args.path.display()))?;

    let api_key = args.api_key.as_deref().or(config.oracle_api_key.as_deref());
    let builder = ProfileBuilder::from_credentials(api_key, config.oracle_policy());
    let extractor = Arc::new(TextExtractor::from_config(&config.ocr));

    let outcome = parse_resume(document, extractor, &builder).await?;
    for warning in &outcome.warnings {
        tracing::warn!("{warning}");
    }

    let json = serde_json::to_string_pretty(&outcome)?;
    write_output(args.out.as_deref(), &json).await
}

pub async fn run_rank_file(args: &RankArgs, config: &Config) -> Result<()> {
    let raw = tokio::fs::read_to_string(&args.request)
        .await
        .with_context(|| format!("Failed to read {}", args.request.display()))?;
    let request: RankRequest = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid rank request", args.request.display()))?;

    let embedder = HashingEmbedder::new(config.embedding_dims);
    let corpus_path = args.corpus.as_deref().or(config.corpus_path.as_deref());
    let corpus = JobCorpus::load_json(corpus_path, &embedder)?;
    let snapshot = corpus.snapshot();
    info!("Ranking against {} posting(s)", snapshot.len());

    let response = run_rank(&request, &snapshot, &embedder)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn write_output(out: Option<&Path>, json: &str) -> Result<()> {
    match out {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Profile written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
