mod ask_cmd;
mod check_cmd;
mod datasets_cmd;
mod runtime;
mod serve_cmd;
mod terminal_output;
mod token_cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use insightbot_config::{config_file_path, load_config};
use insightbot_logging::init_logger;

#[derive(Parser)]
#[command(name = "insightbot")]
#[command(about = "insightbot: ask a Power BI dataset questions in plain language")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $INSIGHTBOT_CONFIG, then ./insightbot.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask a single question from the terminal
    Ask {
        /// Dataset key (defaults to session.defaultDataset)
        #[arg(short, long)]
        dataset: Option<String>,
        question: String,
    },
    /// List registered datasets
    Datasets,
    /// Print entry parameters signed with the shared secret
    MintToken {
        /// Unix timestamp to sign (defaults to now)
        #[arg(long)]
        at: Option<i64>,
    },
    /// Validate config, secrets and datasets without starting
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = config_file_path(cli.config.as_deref());
    let config = load_config(&path).await?;

    init_logger(&config.logging.dir, &config.logging.level)?;

    match cli.command {
        Commands::Serve { port } => serve_cmd::run(config, port).await,
        Commands::Ask { dataset, question } => ask_cmd::run(config, dataset, question).await,
        Commands::Datasets => datasets_cmd::run(&config).await,
        Commands::MintToken { at } => token_cmd::run(&config, at),
        Commands::CheckConfig => check_cmd::run(&path, &config).await,
    }
}
