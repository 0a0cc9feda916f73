//! Tailgen CLI Binary
//!
//! Command-line interface for the knowledge-graph tail-generation pipeline.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use tailgen::backend::build_backend;
use tailgen::checkpoint::{read_string_array, write_string_array};
use tailgen::cli::{format_reduce_summary, format_run_summary, map_error, Cli, Commands};
use tailgen::config::{BackendKind, RunConfig};
use tailgen::corpus::ParseMode;
use tailgen::error::PipelineError;
use tailgen::logging::init_logging;
use tailgen::reduce::top_picks;
use tailgen::run::run_generation;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };
    apply_logging_overrides(&mut config, &cli);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("tailgen starting");

    match execute(&cli, config).await {
        Ok(output) => {
            info!("Command completed successfully");
            print!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

async fn execute(cli: &Cli, mut config: RunConfig) -> Result<String, PipelineError> {
    match &cli.command {
        Commands::Run {
            incontext,
            inputs,
            records,
            candidates,
            top_picks: top_picks_path,
            k_shot,
            subsample,
            seed,
            backend,
            model,
            base_url,
            api_key,
            lenient,
        } => {
            apply_path_override(&mut config.incontext_path, incontext);
            apply_path_override(&mut config.inputs_path, inputs);
            apply_path_override(&mut config.records_path, records);
            apply_path_override(&mut config.candidates_path, candidates);
            apply_path_override(&mut config.top_picks_path, top_picks_path);
            if let Some(k) = k_shot {
                config.k_shot = *k;
            }
            if let Some(n) = subsample {
                config.subsample = Some(*n);
            }
            if let Some(s) = seed {
                config.seed = *s;
            }
            if let Some(kind) = backend {
                config.backend.kind = kind.parse::<BackendKind>()?;
            }
            if let Some(m) = model {
                config.backend.model = m.clone();
            }
            if let Some(url) = base_url {
                config.backend.base_url = url.clone();
            }
            if let Some(key) = api_key {
                config.backend.api_key = Some(key.clone());
            }
            if *lenient {
                config.parse_mode = ParseMode::Lenient;
            }
            config.validate()?;

            let backend = build_backend(&config.backend)?;
            info!(backend = backend.name(), "backend ready");
            let summary = run_generation(&config, backend.as_ref()).await?;
            Ok(format_run_summary(&summary, &config))
        }
        Commands::Reduce {
            candidates,
            top_picks: top_picks_path,
        } => {
            apply_path_override(&mut config.candidates_path, candidates);
            apply_path_override(&mut config.top_picks_path, top_picks_path);

            let lines = read_string_array(&config.candidates_path)?;
            let picks = top_picks(&lines);
            write_string_array(&config.top_picks_path, &picks)?;
            Ok(format_reduce_summary(lines.len(), picks.len()))
        }
    }
}

fn load_config(cli: &Cli) -> Result<RunConfig, PipelineError> {
    match &cli.config {
        Some(path) => RunConfig::load_from_file(path),
        None => Ok(RunConfig::default()),
    }
}

fn apply_path_override(target: &mut PathBuf, value: &Option<PathBuf>) {
    if let Some(path) = value {
        *target = path.clone();
    }
}

/// Fold logging-related CLI flags into the loaded configuration.
/// Precedence: CLI flags override config file override defaults.
fn apply_logging_overrides(config: &mut RunConfig, cli: &Cli) {
    if cli.verbose {
        config.verbose = true;
        config.logging.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.logging.output = output.clone();
    }
}
