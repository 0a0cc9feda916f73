//! Generation run orchestrator.
//!
//! Processes queries strictly sequentially: render prompt, call the backend,
//! validate, checkpoint, advance. Per-query errors are logged and skipped; only
//! corpus-integrity and I/O failures abort the batch. Disk state is rewritten
//! after every accepted query so a crash loses at most the in-flight result.

use crate::backend::GenerationBackend;
use crate::checkpoint::{flatten, write_string_array, CheckpointWriter, GenerationRecord};
use crate::config::{BackendKind, RunConfig};
use crate::corpus::{read_tuple_lines, CorpusIndex};
use crate::error::PipelineError;
use crate::prompt::{PromptBuilder, PromptTemplates};
use crate::query::{Query, QuerySet};
use crate::reduce::top_picks;
use crate::response::{ResponseShape, ResponseValidator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// Outcome counts for one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Queries selected for this run (after any subsampling).
    pub total: usize,
    /// Queries with an accepted, checkpointed result.
    pub processed: usize,
    /// Queries skipped on a query-local error.
    pub skipped: usize,
}

/// Execute a full generation batch against `backend`.
pub async fn run_generation(
    config: &RunConfig,
    backend: &dyn GenerationBackend,
) -> Result<RunSummary, PipelineError> {
    let mut rng = StdRng::seed_from_u64(config.seed);

    let seed_lines = read_tuple_lines(&config.incontext_path)?;
    let index = CorpusIndex::from_lines(&seed_lines, config.parse_mode)?;
    info!(
        relations = index.relation_count(),
        "in-context corpus indexed"
    );

    let input_lines = read_tuple_lines(&config.inputs_path)?;
    let mut queries = QuerySet::from_lines(&input_lines)?;
    info!(queries = queries.len(), "query set derived");

    if let Some(k) = config.subsample {
        queries = queries.subsample(k, &mut rng);
        info!(queries = queries.len(), "query set subsampled");
    }

    let templates = PromptTemplates::load(&config.zero_shot_template, &config.few_shot_template)?;
    let builder = PromptBuilder::new(&index, &templates, config.k_shot);
    let validator = ResponseValidator::new(match config.backend.kind {
        BackendKind::Chat => ResponseShape::Structured,
        BackendKind::Raw => ResponseShape::RawText,
    });
    let writer = CheckpointWriter::new(
        config.records_path.clone(),
        config.candidates_path.clone(),
    );

    let mut records: Vec<GenerationRecord> = Vec::new();
    let mut summary = RunSummary {
        total: queries.len(),
        processed: 0,
        skipped: 0,
    };

    for query in queries.iter() {
        match process_query(query, &builder, backend, &validator, config.verbose, &mut rng).await {
            Ok(record) => {
                records.push(record);
                writer.write(&records)?;
                summary.processed += 1;
            }
            Err(err) if err.is_query_local() => {
                warn!(
                    head = %query.head,
                    relation = %query.relation,
                    "skipping query: {}",
                    err
                );
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    let picks = top_picks(&flatten(&records));
    write_string_array(&config.top_picks_path, &picks)?;

    info!(
        total = summary.total,
        processed = summary.processed,
        skipped = summary.skipped,
        "generation run finished"
    );
    Ok(summary)
}

/// Process one query end to end: prompt, generate, validate.
async fn process_query(
    query: &Query,
    builder: &PromptBuilder<'_>,
    backend: &dyn GenerationBackend,
    validator: &ResponseValidator,
    verbose: bool,
    rng: &mut StdRng,
) -> Result<GenerationRecord, PipelineError> {
    let rendered = builder.build(query, rng)?;
    if verbose {
        debug!(
            head = %query.head,
            relation = %query.relation,
            context_heads = ?rendered.context_heads,
            prompt = %rendered.prompt,
            "query prepared"
        );
    }

    let raw = backend.generate(&rendered.prompt).await?;
    let tails = validator.validate(&raw)?;

    Ok(GenerationRecord {
        prompt: rendered.prompt,
        context_heads: rendered.context_heads,
        contexts: rendered.context_records,
        head: query.head.clone(),
        rel: query.relation.clone(),
        tails,
    })
}
