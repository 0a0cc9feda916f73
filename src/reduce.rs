//! Top-pick reduction: one canonical candidate per (head, relation).
//!
//! Intentionally position-sensitive: the first candidate line seen for a key
//! wins, which makes the first-of-five tails of the first-processed query the
//! canonical pick. No scoring is involved.

use std::collections::HashSet;

/// Key a candidate line by its first two tab-separated fields.
fn key_of(line: &str) -> (String, String) {
    let mut fields = line.splitn(3, '\t');
    let head = fields.next().unwrap_or("").to_string();
    let relation = fields.next().unwrap_or("").to_string();
    (head, relation)
}

/// Keep the first line per distinct (head, relation), in input order.
pub fn top_picks(lines: &[String]) -> Vec<String> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut picks = Vec::new();
    for line in lines {
        if seen.insert(key_of(line)) {
            picks.push(line.clone());
        }
    }
    picks
}
