//! CLI domain: parse, output, and presentation only.
//! No domain orchestration; the binary dispatches to domain services.

mod output;
mod parse;

pub use output::{format_reduce_summary, format_run_summary, map_error};
pub use parse::{Cli, Commands};
