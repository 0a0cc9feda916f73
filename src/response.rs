//! Response validation: parse backend output into exactly five tail candidates.
//!
//! The raw-text path carries an instruction-marker prefix and frequently
//! truncated JSON; both repairs live here so they can be dropped once the
//! backend guarantees structured output.

use crate::error::PipelineError;
use serde_json::Value;

/// Number of tail candidates a valid response must carry.
pub const EXPECTED_TAIL_COUNT: usize = 5;

/// Marker closing the instruction block in raw-text generations.
const INSTRUCTION_MARKER: &str = "[/INST]";

/// Shape of the backend output this validator receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Chat-completion content, already constrained to a JSON object.
    Structured,
    /// Raw generation: instruction prefix plus loosely delimited JSON.
    RawText,
}

/// Parses backend output into exactly five tails or rejects it.
#[derive(Debug, Clone, Copy)]
pub struct ResponseValidator {
    shape: ResponseShape,
}

impl ResponseValidator {
    pub fn new(shape: ResponseShape) -> Self {
        Self { shape }
    }

    /// Validate raw backend text into the five tail strings, in given order.
    pub fn validate(&self, raw: &str) -> Result<Vec<String>, PipelineError> {
        let text = match self.shape {
            ResponseShape::Structured => raw.to_string(),
            ResponseShape::RawText => extract_json_span(strip_instruction_marker(raw)),
        };

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| PipelineError::InvalidResponse(format!("not valid JSON: {}", e)))?;

        let tails = value
            .get("tails")
            .ok_or_else(|| PipelineError::InvalidResponse("missing 'tails' field".to_string()))?
            .as_array()
            .ok_or_else(|| PipelineError::InvalidResponse("'tails' is not an array".to_string()))?;

        if tails.len() != EXPECTED_TAIL_COUNT {
            return Err(PipelineError::InvalidResponse(format!(
                "expected exactly {} tails, got {}",
                EXPECTED_TAIL_COUNT,
                tails.len()
            )));
        }

        tails
            .iter()
            .map(|tail| {
                tail.as_str().map(str::to_string).ok_or_else(|| {
                    PipelineError::InvalidResponse("'tails' element is not a string".to_string())
                })
            })
            .collect()
    }
}

/// Drop everything up to and including the last instruction marker.
fn strip_instruction_marker(text: &str) -> &str {
    match text.rfind(INSTRUCTION_MARKER) {
        Some(pos) => &text[pos + INSTRUCTION_MARKER.len()..],
        None => text,
    }
}

/// Trim to the first `{` / last `}` span, appending a closing brace when the
/// span starts with `{` but the generation was cut off before closing it.
fn extract_json_span(text: &str) -> String {
    let start = text.find('{').unwrap_or(0);
    let end = text.rfind('}').map(|pos| pos + 1).unwrap_or(text.len());
    let mut span = if start < end {
        text[start..end].to_string()
    } else {
        text[start..].to_string()
    };
    if span.starts_with('{') && !span.ends_with('}') {
        span.push('}');
    }
    span
}
