//! CLI output: error mapping and run-summary presentation.

use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::run::RunSummary;
use owo_colors::OwoColorize;

/// Map domain errors to a string for CLI output.
/// Keeps the binary thin; extend with stable categories if needed.
pub fn map_error(e: &PipelineError) -> String {
    e.to_string()
}

/// Render the run summary and output locations for stdout.
pub fn format_run_summary(summary: &RunSummary, config: &RunConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Generation run complete".bold()));
    out.push_str(&format!("  queries:   {}\n", summary.total));
    out.push_str(&format!(
        "  processed: {}\n",
        summary.processed.green()
    ));
    if summary.skipped > 0 {
        out.push_str(&format!("  skipped:   {}\n", summary.skipped.yellow()));
    } else {
        out.push_str(&format!("  skipped:   {}\n", summary.skipped));
    }
    out.push_str(&format!("  records:    {}\n", config.records_path.display()));
    out.push_str(&format!(
        "  candidates: {}\n",
        config.candidates_path.display()
    ));
    out.push_str(&format!(
        "  top picks:  {}\n",
        config.top_picks_path.display()
    ));
    out
}

/// Render the reduce summary for stdout.
pub fn format_reduce_summary(candidates: usize, picks: usize) -> String {
    format!(
        "{}\n  candidates: {}\n  picks:      {}\n",
        "Reduce complete".bold(),
        candidates,
        picks.green()
    )
}
