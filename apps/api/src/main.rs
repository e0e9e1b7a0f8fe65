mod cli;
mod config;
mod errors;
mod intake;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::matching::{HashingEmbedder, JobCorpus};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration first (malformed values abort startup)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize structured logging; stderr keeps CLI stdout clean JSON
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("credx_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Command::Serve => serve(config).await,
        Command::Parse(args) => cli::run_parse(args, &config).await,
        Command::Rank(args) => cli::run_rank_file(args, &config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::from(cli::exit_code(&err))
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting credx API v{}", env!("CARGO_PKG_VERSION"));

    if config.oracle_api_key.is_some() {
        info!("Oracle credential configured (model: {})", llm_client::MODEL);
    } else {
        info!("No oracle credential; resume parsing runs in local mode");
    }

    let embedder = HashingEmbedder::new(config.embedding_dims);
    let corpus = JobCorpus::load_json(config.corpus_path.as_deref(), &embedder)?;
    info!("Job corpus ready: {} posting(s)", corpus.snapshot().len());

    let state = AppState::new(config.clone(), corpus);
    info!("Extraction stages: {:?}", state.extractor.methods());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
