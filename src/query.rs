//! Query derivation: the deduplicated, deterministically ordered set of
//! (head, relation) pairs that require generation.

use crate::error::PipelineError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A (head, relation) pair requiring tail generation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Query {
    pub head: String,
    pub relation: String,
}

/// Ordered, duplicate-free queries.
///
/// Sorted ascending by (head, relation) byte order so a run processes queries
/// in a reproducible order regardless of input file order.
#[derive(Debug, Clone, Default)]
pub struct QuerySet {
    queries: Vec<Query>,
}

impl QuerySet {
    /// Collect (head, relation) pairs from tab-delimited input lines.
    ///
    /// The tail segment is ignored if present. Lines with fewer than two
    /// fields are malformed.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
        for (idx, line) in lines.into_iter().enumerate() {
            let fields: Vec<&str> = line.as_ref().split('\t').collect();
            if fields.len() < 2 {
                return Err(PipelineError::MalformedQueryLine {
                    line_no: idx,
                    found: fields.len(),
                });
            }
            pairs.insert((fields[0].to_string(), fields[1].to_string()));
        }
        let queries = pairs
            .into_iter()
            .map(|(head, relation)| Query { head, relation })
            .collect();
        Ok(QuerySet { queries })
    }

    /// Uniform subsample of size `k` without replacement.
    ///
    /// A deliberate throttle for not over-querying the backend; no-op when `k`
    /// covers the whole set. The sample is re-sorted so processing order stays
    /// the canonical query order.
    pub fn subsample(self, k: usize, rng: &mut StdRng) -> Self {
        if k >= self.queries.len() {
            return self;
        }
        let mut sampled: Vec<Query> = self
            .queries
            .choose_multiple(rng, k)
            .cloned()
            .collect();
        sampled.sort();
        QuerySet { queries: sampled }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Query> {
        self.queries.iter()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}
