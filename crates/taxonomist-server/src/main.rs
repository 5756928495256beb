//! Taxonomist CLI
//!
//! Starts the HTTP server, or analyzes a single PDF from the command line.

use anyhow::Context;
use clap::Parser;
use taxonomist_server::cli::{Cli, Command};
use taxonomist_server::config::ServerConfig;
use taxonomist_server::{analyze_file, init_tracing, start_server};
use tracing::warn;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            warn!("No config file specified, using defaults");
            ServerConfig::default()
        }
    };

    match cli.command {
        Command::Serve => start_server(config).await?,
        Command::Analyze(args) => {
            let result = analyze_file(&config, &args.file)
                .await
                .with_context(|| format!("analyzing {}", args.file.display()))?;
            if args.metadata {
                eprintln!("{}", serde_json::to_string_pretty(&result.metadata)?);
            }
            println!("{}", serde_json::to_string_pretty(&result.taxonomy)?);
        }
    }

    Ok(())
}
