//! Seed corpus parsing and the relation → head → tail index.
//!
//! Seed and input files are JSON arrays of tab-joined tuple strings. The index
//! retains only the first-seen tail per (relation, head); that pair defines the
//! canonical in-context example for few-shot prompting.

use crate::error::PipelineError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// One knowledge-graph tuple. Serialized as `head\trelation\ttail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuple {
    pub head: String,
    pub relation: String,
    pub tail: String,
}

impl Tuple {
    /// Parse a tab-delimited tuple line. Fields beyond the third are ignored.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, PipelineError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            return Err(PipelineError::MalformedSeedLine {
                line_no,
                found: fields.len(),
            });
        }
        Ok(Tuple {
            head: fields[0].to_string(),
            relation: fields[1].to_string(),
            tail: fields[2].to_string(),
        })
    }

    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}", self.head, self.relation, self.tail)
    }
}

/// How to treat malformed lines while building the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Abort on the first malformed line. Malformed seed data indicates a
    /// corrupted corpus, so this is the default.
    #[default]
    Strict,
    /// Skip malformed lines with a warning.
    Lenient,
}

/// Insertion-ordered lookup from relation → head → tail.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    relations: IndexMap<String, IndexMap<String, String>>,
}

impl CorpusIndex {
    /// Build the index from tab-delimited tuple lines.
    ///
    /// First-wins: for a given (relation, head) only the first-seen tail is
    /// retained. Rebuilding from the same lines is idempotent.
    pub fn from_lines<I, S>(lines: I, mode: ParseMode) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut relations: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
        for (idx, line) in lines.into_iter().enumerate() {
            let tuple = match Tuple::parse(line.as_ref(), idx) {
                Ok(tuple) => tuple,
                Err(err) => match mode {
                    ParseMode::Strict => return Err(err),
                    ParseMode::Lenient => {
                        warn!(line_no = idx, "skipping malformed seed line: {}", err);
                        continue;
                    }
                },
            };
            let heads = relations.entry(tuple.relation).or_default();
            heads.entry(tuple.head).or_insert(tuple.tail);
        }
        Ok(CorpusIndex { relations })
    }

    /// All (head → tail) examples for a relation, in seed order.
    pub fn heads_for_relation(&self, relation: &str) -> Option<&IndexMap<String, String>> {
        self.relations.get(relation)
    }

    pub fn tail_for(&self, relation: &str, head: &str) -> Option<&str> {
        self.relations
            .get(relation)
            .and_then(|heads| heads.get(head))
            .map(String::as_str)
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// Read a tuple file: a JSON array of tab-joined strings, UTF-8.
pub fn read_tuple_lines(path: &Path) -> Result<Vec<String>, PipelineError> {
    let raw = fs::read_to_string(path)?;
    let lines: Vec<String> = serde_json::from_str(&raw)?;
    Ok(lines)
}
