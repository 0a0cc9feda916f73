//! Run configuration.
//!
//! A run is fully described by one TOML file; every field has a default so an
//! empty file (or none at all) yields a working chat-backend configuration.
//! CLI flags override file values; the API key may also come from the
//! `TAILGEN_API_KEY` environment variable.

use crate::backend::RetryPolicy;
use crate::corpus::ParseMode;
use crate::error::PipelineError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable consulted when the config carries no API key.
pub const API_KEY_ENV: &str = "TAILGEN_API_KEY";

/// Root run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seed (in-context) tuple file: JSON array of `head\trelation\ttail`.
    pub incontext_path: PathBuf,

    /// Input tuple file whose (head, relation) pairs need generation.
    pub inputs_path: PathBuf,

    /// Line-oriented structured-record output (one JSON record per result).
    pub records_path: PathBuf,

    /// Flat JSON array of all generated `head\trelation\ttail` candidates.
    pub candidates_path: PathBuf,

    /// Flat JSON array of deduplicated top-1 candidates.
    pub top_picks_path: PathBuf,

    /// Zero-shot prompt template.
    pub zero_shot_template: PathBuf,

    /// Few-shot prompt template.
    pub few_shot_template: PathBuf,

    /// Few-shot k. Zero selects the zero-shot template.
    pub k_shot: usize,

    /// Optional uniform query subsample size. Disabled by default; a throttle
    /// for not over-querying the backend, never implicit.
    pub subsample: Option<usize>,

    /// Seed for query subsampling and context-head sampling.
    pub seed: u64,

    /// How to treat malformed corpus lines.
    pub parse_mode: ParseMode,

    /// Echo prompts and sampled heads at debug level. No behavioral effect.
    pub verbose: bool,

    /// Backend selection and connection settings.
    pub backend: BackendConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            incontext_path: PathBuf::from("data/raw/json/train.json"),
            inputs_path: PathBuf::from("data/raw/json/test.json"),
            records_path: PathBuf::from("data/generate/output_dicts.jsonl"),
            candidates_path: PathBuf::from("data/generate/kg_data.json"),
            top_picks_path: PathBuf::from("data/generate/top1picks.json"),
            zero_shot_template: PathBuf::from("resources/zero-shot.txt"),
            few_shot_template: PathBuf::from("resources/few-shot.txt"),
            k_shot: 5,
            subsample: None,
            seed: 84,
            parse_mode: ParseMode::default(),
            verbose: false,
            backend: BackendConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Which backend adapter to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Chat-completion endpoint returning structured choices.
    #[default]
    Chat,
    /// Local raw-text endpoint (`POST /chat`) requiring JSON extraction.
    Raw,
}

impl std::str::FromStr for BackendKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(BackendKind::Chat),
            "raw" => Ok(BackendKind::Raw),
            other => Err(PipelineError::Config(format!(
                "Unknown backend kind: {} (must be 'chat' or 'raw')",
                other
            ))),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,

    /// Model identifier sent to the chat backend.
    pub model: String,

    /// API base URL (chat) or server base URL (raw).
    pub base_url: String,

    /// API key; falls back to `TAILGEN_API_KEY` when unset.
    pub api_key: Option<String>,

    /// Retry attempts for the raw-text adapter.
    pub retry_attempts: usize,

    /// Fixed delay between raw-text attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Chat,
            model: "gpt-4-1106-preview".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            retry_attempts: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl BackendConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl RunConfig {
    /// Load from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path)?;
        let config: RunConfig = toml::from_str(&raw)
            .map_err(|e| PipelineError::Config(format!("Failed to parse {:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if let Some(0) = self.subsample {
            return Err(PipelineError::Config(
                "subsample must be greater than zero when set".to_string(),
            ));
        }
        if self.backend.retry_attempts == 0 {
            return Err(PipelineError::Config(
                "backend.retry_attempts must be at least 1".to_string(),
            ));
        }
        if self.backend.base_url.is_empty() {
            return Err(PipelineError::Config(
                "backend.base_url cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
