//! Integration tests for the ocr-bridge binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const ENV_VARS: [&str; 7] = [
    "OCR_BRIDGE_HOST",
    "OCR_BRIDGE_PORT",
    "OCR_BRIDGE_CORS_ORIGINS",
    "OCR_BRIDGE_MAX_REQUEST_BODY_BYTES",
    "OCR_BRIDGE_LANGUAGE",
    "OCR_BRIDGE_DEVICE",
    "RUST_LOG",
];

fn run(dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ocr-bridge"));
    command.args(args).current_dir(dir);
    for var in ENV_VARS {
        command.env_remove(var);
    }
    command.output().expect("Failed to execute ocr-bridge")
}

#[test]
fn test_help_lists_subcommands() {
    let dir = tempdir().unwrap();
    let output = run(dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("recognize"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_serve_help_lists_flags() {
    let dir = tempdir().unwrap();
    let output = run(dir.path(), &["serve", "--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--host"));
    assert!(stdout.contains("--port"));
    assert!(stdout.contains("--device"));
}

#[test]
fn test_config_prints_defaults() {
    let dir = tempdir().unwrap();
    let output = run(dir.path(), &["config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port = 5000"));
    assert!(stdout.contains("language = \"en\""));
    assert!(stdout.contains("device = \"gpu\""));
}

#[test]
fn test_config_merges_file_and_flags() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bridge.toml");
    fs::write(&config_path, "[server]\nport = 7070\n\n[engine]\nlanguage = \"ch\"\n").unwrap();

    let output = run(
        dir.path(),
        &["config", "-c", config_path.to_str().unwrap(), "--device", "cpu"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port = 7070"));
    assert!(stdout.contains("language = \"ch\""));
    assert!(stdout.contains("device = \"cpu\""));
}

#[test]
fn test_config_discovers_file_in_working_directory() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("ocr-bridge.toml"), "[server]\nport = 6123\n").unwrap();

    let output = run(dir.path(), &["config"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("port = 6123"));
}

#[test]
fn test_invalid_device_flag_rejected() {
    let dir = tempdir().unwrap();
    let output = run(dir.path(), &["config", "--device", "abacus"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("abacus"));
}

#[test]
fn test_unsupported_config_extension_fails() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bridge.ini");
    fs::write(&config_path, "port=1").unwrap();

    let output = run(dir.path(), &["config", "-c", config_path.to_str().unwrap()]);

    assert!(!output.status.success());
}

#[test]
fn test_recognize_missing_file_fails() {
    let dir = tempdir().unwrap();
    let output = run(dir.path(), &["recognize", "does-not-exist.png"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does-not-exist.png"));
}

#[cfg(not(feature = "paddle"))]
#[test]
fn test_serve_without_engine_fails_fast() {
    let dir = tempdir().unwrap();
    let output = run(dir.path(), &["serve", "-p", "18765"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to initialize OCR engine"));
    assert!(stderr.contains("paddle"));
}
