//! Tests for the command-line binary.

use std::process::Command;

fn strictly_blitz() -> Command {
    Command::new(env!("CARGO_BIN_EXE_strictly_blitz"))
}

#[test]
fn test_validate_move_with_debug_flag() {
    let output = strictly_blitz()
        .args(["--debug", "validate", "move", "e2e4"])
        .output()
        .expect("Failed to run binary");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("valid"), "stdout: {}", stdout);
}

#[test]
fn test_validate_bad_move_fails() {
    let output = strictly_blitz()
        .args(["validate", "move", "zz99"])
        .output()
        .expect("Failed to run binary");
    assert!(!output.status.success());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("absent.toml");
    let output = strictly_blitz()
        .arg("--config")
        .arg(&missing)
        .args(["validate", "move", "e2e4"])
        .output()
        .expect("Failed to run binary");
    assert!(!output.status.success());
}
