//! Checkpoint projection: disk state always reflects accepted results

use super::test_utils::{tails_payload, RunFixture, ScriptedBackend};
use tailgen::checkpoint::read_string_array;
use tailgen::run::run_generation;

#[tokio::test]
async fn outputs_are_projections_of_the_record_log() {
    let fixture = RunFixture::new(
        &["apple\tAtLocation\ttree"],
        &[
            "a\tr1\tx",
            "b\tr1\tx",
            "c\tr1\tx",
            "d\tr1\tx",
        ],
        0,
    );
    let backend = ScriptedBackend::uniform(4);

    run_generation(&fixture.config, &backend).await.unwrap();

    let raw = std::fs::read_to_string(&fixture.config.records_path).unwrap();
    let records: Vec<serde_json::Value> = raw
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let candidates = read_string_array(&fixture.config.candidates_path).unwrap();
    let picks = read_string_array(&fixture.config.top_picks_path).unwrap();

    // candidate list is exactly the record log flattened in order
    let expected: Vec<String> = records
        .iter()
        .flat_map(|rec| {
            let head = rec["head"].as_str().unwrap().to_string();
            let rel = rec["rel"].as_str().unwrap().to_string();
            rec["tails"]
                .as_array()
                .unwrap()
                .iter()
                .map(move |t| format!("{}\t{}\t{}", head, rel, t.as_str().unwrap()))
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(candidates, expected);

    // one pick per record, and it is that record's first tail
    assert_eq!(picks.len(), records.len());
    for (pick, rec) in picks.iter().zip(&records) {
        let first = rec["tails"][0].as_str().unwrap();
        assert!(pick.ends_with(&format!("\t{}", first)));
    }
}

#[tokio::test]
async fn skipped_queries_never_reach_disk() {
    let fixture = RunFixture::new(
        &["apple\tAtLocation\ttree"],
        &["a\tr1\tx", "b\tr1\tx", "c\tr1\tx"],
        0,
    );
    // middle query returns a malformed payload and is rejected
    let backend = ScriptedBackend::new([
        Ok(tails_payload("a")),
        Ok(r#"{"tails": "not an array"}"#.to_string()),
        Ok(tails_payload("c")),
    ]);

    let summary = run_generation(&fixture.config, &backend).await.unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);

    let candidates = read_string_array(&fixture.config.candidates_path).unwrap();
    assert_eq!(candidates.len(), 10);
    assert!(candidates.iter().all(|l| !l.starts_with("b\t")));

    let raw = std::fs::read_to_string(&fixture.config.records_path).unwrap();
    assert_eq!(raw.lines().count(), 2);
}

#[tokio::test]
async fn rerun_overwrites_stale_checkpoints() {
    let fixture = RunFixture::new(
        &["apple\tAtLocation\ttree"],
        &["a\tr1\tx", "b\tr1\tx"],
        0,
    );

    let backend = ScriptedBackend::uniform(2);
    run_generation(&fixture.config, &backend).await.unwrap();

    // second run with fresh responses replaces the files wholesale
    let backend = ScriptedBackend::new([Ok(tails_payload("n")), Ok(tails_payload("m"))]);
    run_generation(&fixture.config, &backend).await.unwrap();

    let candidates = read_string_array(&fixture.config.candidates_path).unwrap();
    assert_eq!(candidates.len(), 10);
    assert_eq!(candidates[0], "a\tr1\tn1");
    assert!(!candidates.iter().any(|l| l.contains("c0_")));
}
