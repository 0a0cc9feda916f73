//! Tailgen: knowledge-graph tail generation.
//!
//! Takes a corpus of `head\trelation\ttail` seed tuples and a set of
//! (head, relation) queries, prompts a text-generation backend for five
//! candidate tails per query, and reduces the accepted candidates to one
//! canonical pick per query. Runs are deterministic for a fixed seed and
//! checkpointed to disk after every accepted query.

pub mod backend;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod logging;
pub mod prompt;
pub mod query;
pub mod reduce;
pub mod response;
pub mod run;
