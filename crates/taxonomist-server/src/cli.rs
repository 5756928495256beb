//! Command-line interface definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Taxonomist - build a patent taxonomy from a PDF with an LLM.
#[derive(Debug, Parser)]
#[command(name = "taxonomist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults apply when omitted)
    #[arg(short, long, global = true, env = "TAXONOMIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API
    Serve,

    /// Analyze one PDF and print the taxonomy as JSON
    Analyze(AnalyzeArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, clap::Args)]
pub struct AnalyzeArgs {
    /// PDF file to analyze
    pub file: PathBuf,

    /// Also print run metadata to stderr
    #[arg(long)]
    pub metadata: bool,
}
