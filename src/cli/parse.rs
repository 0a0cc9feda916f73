//! CLI parse: clap types for tailgen. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tailgen CLI - Knowledge-graph tail generation
#[derive(Parser)]
#[command(name = "tailgen")]
#[command(about = "Generate candidate tail entities for knowledge-graph tuples")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging and prompt echoing (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr)
    #[arg(long)]
    pub log_output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full generation batch
    Run {
        /// In-context (seed) tuple file
        #[arg(long)]
        incontext: Option<PathBuf>,
        /// Input tuple file to generate tails for
        #[arg(long)]
        inputs: Option<PathBuf>,
        /// Structured record output (JSONL)
        #[arg(long)]
        records: Option<PathBuf>,
        /// Flat candidate array output (JSON)
        #[arg(long)]
        candidates: Option<PathBuf>,
        /// Top-1 picks output (JSON)
        #[arg(long)]
        top_picks: Option<PathBuf>,
        /// Few-shot example count (0 = zero-shot)
        #[arg(long)]
        k_shot: Option<usize>,
        /// Uniform query subsample size
        #[arg(long)]
        subsample: Option<usize>,
        /// RNG seed for subsampling and context selection
        #[arg(long)]
        seed: Option<u64>,
        /// Backend kind (chat or raw)
        #[arg(long)]
        backend: Option<String>,
        /// Model identifier for the chat backend
        #[arg(long)]
        model: Option<String>,
        /// Backend base URL
        #[arg(long)]
        base_url: Option<String>,
        /// API key (overrides config and environment)
        #[arg(long)]
        api_key: Option<String>,
        /// Skip malformed corpus lines instead of aborting
        #[arg(long)]
        lenient: bool,
    },
    /// Recompute top-1 picks from an existing candidate file
    Reduce {
        /// Flat candidate array input (JSON)
        #[arg(long)]
        candidates: Option<PathBuf>,
        /// Top-1 picks output (JSON)
        #[arg(long)]
        top_picks: Option<PathBuf>,
    },
}
