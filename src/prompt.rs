//! Prompt assembly: few-shot context sampling and template rendering.
//!
//! Templates are plain text files carrying literal `{{ input }}` and, for the
//! few-shot template, `{{ examples }}` tokens substituted by exact string
//! replacement. Context examples are rendered as one JSON object per line.

use crate::corpus::CorpusIndex;
use crate::error::PipelineError;
use crate::query::Query;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::json;
use std::fs;
use std::path::Path;

pub const INPUT_TOKEN: &str = "{{ input }}";
pub const EXAMPLES_TOKEN: &str = "{{ examples }}";

/// Loaded prompt templates.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    zero_shot: String,
    few_shot: String,
}

impl PromptTemplates {
    /// Load both templates and validate their placeholder tokens.
    pub fn load(zero_shot_path: &Path, few_shot_path: &Path) -> Result<Self, PipelineError> {
        let zero_shot = fs::read_to_string(zero_shot_path)?;
        let few_shot = fs::read_to_string(few_shot_path)?;
        Self::from_strings(zero_shot, few_shot)
    }

    pub fn from_strings(zero_shot: String, few_shot: String) -> Result<Self, PipelineError> {
        if !zero_shot.contains(INPUT_TOKEN) {
            return Err(PipelineError::Template(format!(
                "zero-shot template is missing the {INPUT_TOKEN} token"
            )));
        }
        if !few_shot.contains(INPUT_TOKEN) {
            return Err(PipelineError::Template(format!(
                "few-shot template is missing the {INPUT_TOKEN} token"
            )));
        }
        if !few_shot.contains(EXAMPLES_TOKEN) {
            return Err(PipelineError::Template(format!(
                "few-shot template is missing the {EXAMPLES_TOKEN} token"
            )));
        }
        Ok(PromptTemplates {
            zero_shot,
            few_shot,
        })
    }
}

/// A rendered prompt plus the context that went into it.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub prompt: String,
    /// Sampled context heads, in sample order. Empty for zero-shot.
    pub context_heads: Vec<String>,
    /// Rendered context JSON lines, parallel to `context_heads`.
    pub context_records: Vec<String>,
}

/// Renders one prompt per query from the corpus index.
pub struct PromptBuilder<'a> {
    index: &'a CorpusIndex,
    templates: &'a PromptTemplates,
    k_shot: usize,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(index: &'a CorpusIndex, templates: &'a PromptTemplates, k_shot: usize) -> Self {
        Self {
            index,
            templates,
            k_shot,
        }
    }

    /// Render the prompt for one query.
    ///
    /// For `k_shot > 0`, samples exactly `k_shot` context heads for the query's
    /// relation, excluding the query's own head. Fewer eligible heads than
    /// `k_shot` is a hard error, never a truncated sample.
    pub fn build(&self, query: &Query, rng: &mut StdRng) -> Result<RenderedPrompt, PipelineError> {
        let input = json!({ "head": query.head, "relations": query.relation }).to_string();

        if self.k_shot == 0 {
            return Ok(RenderedPrompt {
                prompt: self.templates.zero_shot.replace(INPUT_TOKEN, &input),
                context_heads: Vec::new(),
                context_records: Vec::new(),
            });
        }

        let eligible: Vec<&String> = self
            .index
            .heads_for_relation(&query.relation)
            .map(|heads| heads.keys().filter(|h| **h != query.head).collect())
            .unwrap_or_default();

        if eligible.len() < self.k_shot {
            return Err(PipelineError::InsufficientContext {
                relation: query.relation.clone(),
                available: eligible.len(),
                requested: self.k_shot,
            });
        }

        let context_heads: Vec<String> = eligible
            .choose_multiple(rng, self.k_shot)
            .map(|h| (*h).clone())
            .collect();

        let context_records: Vec<String> = context_heads
            .iter()
            .map(|head| {
                // The head came out of the relation map, so the tail is present.
                let tail = self.index.tail_for(&query.relation, head).unwrap_or("");
                json!({
                    "head": head,
                    "relations": query.relation,
                    "tails": [tail],
                })
                .to_string()
            })
            .collect();

        let prompt = self
            .templates
            .few_shot
            .replace(EXAMPLES_TOKEN, &context_records.join("\n"))
            .replace(INPUT_TOKEN, &input);

        Ok(RenderedPrompt {
            prompt,
            context_heads,
            context_records,
        })
    }
}
