//! Configuration loading and precedence

use std::fs;
use tailgen::config::{BackendKind, RunConfig};
use tempfile::TempDir;

#[test]
fn full_toml_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tailgen.toml");
    fs::write(
        &path,
        r#"
incontext_path = "data/train.json"
inputs_path = "data/test.json"
k_shot = 2
subsample = 300
seed = 7
parse_mode = "lenient"
verbose = true

[backend]
kind = "raw"
base_url = "http://localhost:10000"
retry_attempts = 5
retry_delay_ms = 500

[logging]
level = "debug"
format = "json"
output = "stdout"
"#,
    )
    .unwrap();

    let config = RunConfig::load_from_file(&path).unwrap();
    assert_eq!(config.incontext_path, std::path::PathBuf::from("data/train.json"));
    assert_eq!(config.inputs_path, std::path::PathBuf::from("data/test.json"));
    assert_eq!(config.k_shot, 2);
    assert_eq!(config.subsample, Some(300));
    assert_eq!(config.seed, 7);
    assert!(config.verbose);
    assert_eq!(config.backend.kind, BackendKind::Raw);
    assert_eq!(config.backend.retry_attempts, 5);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn invalid_backend_kind_is_rejected_at_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tailgen.toml");
    fs::write(&path, "[backend]\nkind = \"llama\"\n").unwrap();
    assert!(RunConfig::load_from_file(&path).is_err());
}

#[test]
fn empty_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tailgen.toml");
    fs::write(&path, "").unwrap();

    let config = RunConfig::load_from_file(&path).unwrap();
    let defaults = RunConfig::default();
    assert_eq!(config.k_shot, defaults.k_shot);
    assert_eq!(config.seed, defaults.seed);
    assert_eq!(config.backend.model, defaults.backend.model);
}
