//! Durable checkpointing of accepted generation results.
//!
//! Both outputs are rewritten in full after every accepted query: a crash
//! between the two writes loses at most the in-flight query and never corrupts
//! prior state. O(n) write cost per query is acceptable because n is bounded
//! by the query subsample size.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One record per successfully processed query. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    #[serde(rename = "input_prompt")]
    pub prompt: String,
    pub context_heads: Vec<String>,
    pub contexts: Vec<String>,
    pub head: String,
    pub rel: String,
    pub tails: Vec<String>,
}

impl GenerationRecord {
    /// Expand to `head\trel\ttail` candidate lines, one per tail.
    pub fn flat_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.tails
            .iter()
            .map(|tail| format!("{}\t{}\t{}", self.head, self.rel, tail))
    }
}

/// Expand records to the flat candidate list, in generation order.
pub fn flatten(records: &[GenerationRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(GenerationRecord::flat_lines)
        .collect()
}

/// Rewrites the two durable outputs from the accumulated result list.
pub struct CheckpointWriter {
    records_path: PathBuf,
    candidates_path: PathBuf,
}

impl CheckpointWriter {
    pub fn new(records_path: PathBuf, candidates_path: PathBuf) -> Self {
        Self {
            records_path,
            candidates_path,
        }
    }

    /// Rewrite both outputs in full from `records`.
    pub fn write(&self, records: &[GenerationRecord]) -> Result<(), PipelineError> {
        write_record_lines(&self.records_path, records)?;
        write_string_array(&self.candidates_path, &flatten(records))?;
        Ok(())
    }

    pub fn records_path(&self) -> &Path {
        &self.records_path
    }

    pub fn candidates_path(&self) -> &Path {
        &self.candidates_path
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write records as line-oriented JSON, one record per line.
fn write_record_lines(path: &Path, records: &[GenerationRecord]) -> Result<(), PipelineError> {
    ensure_parent_dir(path)?;
    let mut file = fs::File::create(path)?;
    for record in records {
        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

/// Write a flat JSON array of strings, pretty-printed, non-ASCII unescaped.
pub fn write_string_array(path: &Path, lines: &[String]) -> Result<(), PipelineError> {
    ensure_parent_dir(path)?;
    let body = serde_json::to_string_pretty(lines)?;
    fs::write(path, body)?;
    Ok(())
}

/// Read a flat JSON array of strings.
pub fn read_string_array(path: &Path) -> Result<Vec<String>, PipelineError> {
    let raw = fs::read_to_string(path)?;
    let lines: Vec<String> = serde_json::from_str(&raw)?;
    Ok(lines)
}
