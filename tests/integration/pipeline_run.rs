//! End-to-end pipeline runs against a scripted backend

use super::test_utils::{tails_payload, RunFixture, ScriptedBackend};
use tailgen::checkpoint::read_string_array;
use tailgen::config::BackendKind;
use tailgen::run::run_generation;

#[tokio::test]
async fn few_shot_run_produces_all_three_outputs() {
    let fixture = RunFixture::new(
        &[
            "apple\tAtLocation\ttree",
            "book\tAtLocation\tshelf",
            "coin\tAtLocation\tpocket",
            "dish\tAtLocation\tsink",
        ],
        &["lamp\tAtLocation\tdesk", "rug\tAtLocation\tfloor"],
        2,
    );
    let backend = ScriptedBackend::uniform(2);

    let summary = run_generation(&fixture.config, &backend).await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 0);

    // structured records: one JSON line per processed query
    let raw = std::fs::read_to_string(&fixture.config.records_path).unwrap();
    let records: Vec<serde_json::Value> = raw
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    // queries are processed in sorted order: lamp before rug
    assert_eq!(records[0]["head"], "lamp");
    assert_eq!(records[0]["rel"], "AtLocation");
    assert_eq!(records[0]["context_heads"].as_array().unwrap().len(), 2);
    assert!(records[0]["input_prompt"]
        .as_str()
        .unwrap()
        .contains("Examples:"));

    // flat candidates: five per query, in generation order
    let candidates = read_string_array(&fixture.config.candidates_path).unwrap();
    assert_eq!(candidates.len(), 10);
    assert_eq!(candidates[0], "lamp\tAtLocation\tc0_1");
    assert_eq!(candidates[5], "rug\tAtLocation\tc1_1");

    // top picks: first of five per query
    let picks = read_string_array(&fixture.config.top_picks_path).unwrap();
    assert_eq!(
        picks,
        ["lamp\tAtLocation\tc0_1", "rug\tAtLocation\tc1_1"]
    );
}

#[tokio::test]
async fn backend_failure_skips_only_the_failing_query() {
    let fixture = RunFixture::new(
        &["apple\tAtLocation\ttree"],
        &["lamp\tAtLocation\tdesk", "rug\tAtLocation\tfloor"],
        0,
    );
    let backend = ScriptedBackend::new([
        Err("connection refused".to_string()),
        Ok(tails_payload("t")),
    ]);

    let summary = run_generation(&fixture.config, &backend).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);

    let candidates = read_string_array(&fixture.config.candidates_path).unwrap();
    assert!(candidates.iter().all(|l| l.starts_with("rug\t")));

    let picks = read_string_array(&fixture.config.top_picks_path).unwrap();
    assert_eq!(picks, ["rug\tAtLocation\tt1"]);
}

#[tokio::test]
async fn raw_backend_response_is_unwrapped_before_validation() {
    let mut fixture = RunFixture::new(
        &["apple\tAtLocation\ttree"],
        &["lamp\tAtLocation\tdesk"],
        0,
    );
    fixture.config.backend.kind = BackendKind::Raw;

    // raw servers echo the instruction block; only the JSON span counts
    let body = format!("some preamble [/INST] noise {} trailing", tails_payload("t"));
    let backend = ScriptedBackend::new([Ok(body)]);

    let summary = run_generation(&fixture.config, &backend).await.unwrap();
    assert_eq!(summary.processed, 1);

    let picks = read_string_array(&fixture.config.top_picks_path).unwrap();
    assert_eq!(picks, ["lamp\tAtLocation\tt1"]);
}

#[tokio::test]
async fn duplicate_queries_are_generated_once() {
    let fixture = RunFixture::new(
        &["apple\tAtLocation\ttree"],
        &[
            "lamp\tAtLocation\tdesk",
            "lamp\tAtLocation\ttable",
            "lamp\tAtLocation\tdesk",
        ],
        0,
    );
    // three input lines collapse to one (head, relation) query
    let backend = ScriptedBackend::uniform(1);

    let summary = run_generation(&fixture.config, &backend).await.unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.processed, 1);
}
