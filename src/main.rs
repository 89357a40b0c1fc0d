mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cyberguard::config::CyberguardConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cyberguard", version, about = "Index cybersecurity event CSVs into a vector store")]
struct Cli {
    /// Config file to use instead of ~/.cyberguard/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed every row of a CSV file and persist the vector index
    Ingest {
        /// CSV file with a header row
        csv: PathBuf,
        /// Directory to write the index into (defaults to storage.store_path)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Report configuration, model files, GPU choice and index status
    Doctor,
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to the configured cache directory
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CyberguardConfig::load_from(path)?,
        None => CyberguardConfig::load()?,
    };

    // Log to stderr so command output on stdout stays clean.
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Ingest { csv, store } => {
            cli::ingest::ingest(&config, csv, store).await?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
    }

    Ok(())
}
