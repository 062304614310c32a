//! maskfill CLI: run a masked-sentence survey session from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(
    name = "maskfill",
    version,
    about = "Collect fill-in-the-blank answers for masked sentences"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive survey session
    Run {
        /// Round label (prompted for when omitted)
        #[arg(long)]
        round: Option<String>,

        /// Dataset label (prompted for when omitted)
        #[arg(long)]
        dataset: Option<String>,

        /// Only present the first N sentences
        #[arg(long)]
        quota: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use a local TOML sentence fixture instead of the configured store
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// With a fixture store, write recorded responses to this JSON file
        #[arg(long)]
        record_to: Option<PathBuf>,
    },

    /// List the sentences in a dataset
    Sentences {
        /// Dataset label (defaults to the configured one)
        #[arg(long)]
        dataset: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Use a local TOML sentence fixture instead of the configured store
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Create a starter config and sentence fixture
    Init,
}

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("maskfill=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            round,
            dataset,
            quota,
            config,
            fixture,
            record_to,
        } => {
            let source = commands::StoreSource {
                config,
                fixture,
                record_to,
            };
            commands::run::execute(round, dataset, quota, source).await
        }
        Commands::Sentences {
            dataset,
            format,
            config,
            fixture,
        } => {
            let source = commands::StoreSource {
                config,
                fixture,
                record_to: None,
            };
            commands::sentences::execute(dataset, format, source).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
