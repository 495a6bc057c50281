//! Tests for harness configuration loading.

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use strictly_blitz::{HarnessConfig, ValidationEngine};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Write failed");
    file
}

#[test]
fn test_empty_file_gives_defaults() {
    let file = write_config("");
    let config = HarnessConfig::from_file(file.path()).expect("Load failed");
    assert_eq!(config, HarnessConfig::default());
    assert!(!*config.debug());
    assert_eq!(config.storage().namespace(), "chessBlitz");
    assert_eq!(*config.storage().error_log_capacity(), 50);
    assert_eq!(*config.game().turn_seconds(), 30);
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let file = write_config(
        r#"
debug = true
critical_keywords = ["Checkmate"]

[storage]
namespace = "arena"
quota_bytes = 4096

[assessment]
per_correct = 100

[timing]
auto_advance = 250
"#,
    );
    let config = HarnessConfig::from_file(file.path()).expect("Load failed");

    assert!(*config.debug());
    assert_eq!(config.critical_keywords(), &vec!["Checkmate".to_string()]);
    assert_eq!(config.storage().namespace(), "arena");
    assert_eq!(*config.storage().quota_bytes(), Some(4096));
    assert_eq!(config.storage().game_state_key(), "chessBlitzGameState");
    assert_eq!(config.assessment().rating_for(2, 1), 800 + 200 - 30);
    assert_eq!(config.timing().auto_advance_delay(), Duration::from_millis(250));
}

#[test]
fn test_namespace_drives_eviction() {
    let config = HarnessConfig::from_toml_str("[storage]\nnamespace = \"arena\"\n")
        .expect("Parse failed");
    assert!(config.storage().is_evictable("arena_log_x"));
    assert!(!config.storage().is_evictable("chessBlitz_log_x"));
}

#[test]
fn test_malformed_config_is_an_error() {
    let err = HarnessConfig::from_toml_str("debug = \"sometimes\"").expect_err("Should fail");
    assert!(err.message.starts_with("Failed to parse config"));

    let missing = HarnessConfig::from_file("/nonexistent/strictly_blitz.toml")
        .expect_err("Missing file should fail");
    assert!(missing.message.starts_with("Failed to read config file"));
}

#[test]
fn test_custom_keywords_drive_classification() {
    let config = HarnessConfig::from_toml_str("critical_keywords = [\"Checkmate\"]")
        .expect("Parse failed");
    let mut engine = ValidationEngine::in_memory(&config);
    engine.log_error("Network", "dropped", serde_json::json!({}));
    engine.log_error("Engine", "Checkmate detection failed", serde_json::json!({}));

    let report = engine.error_report();
    assert_eq!(report.critical_errors.len(), 1);
    assert_eq!(report.critical_errors[0].kind, "Engine");
}
