//! CLI integration tests

use std::process::Command;

fn ktop() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ktop"))
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = ktop().arg("--help").output().expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("[NODE]"), "Should show node argument");
    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("--kubeconfig"), "Should show kubeconfig option");
    assert!(stdout.contains("--report-unmatched"), "Should show unmatched option");
    assert!(stdout.contains("ktop my-node"), "Should show examples");
}

/// Test that the short help flag exits successfully
#[test]
fn test_cli_short_help() {
    let output = ktop().arg("-h").output().expect("Failed to execute command");

    assert!(output.status.success(), "Short help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = ktop().arg("--version").output().expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("ktop"), "Should show binary name");
}

/// Test that an unknown output format is rejected
#[test]
fn test_invalid_format() {
    let output = ktop()
        .args(["--format", "yaml"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Unknown format should fail");
}

/// Test that more than one node name is rejected
#[test]
fn test_two_node_names() {
    let output = ktop()
        .args(["node-a", "node-b"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Extra positional argument should fail");
}

/// Test that a missing kubeconfig is a fatal setup error
#[test]
fn test_missing_kubeconfig_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing-kubeconfig");

    let output = ktop()
        .arg("--kubeconfig")
        .arg(&missing)
        .env("HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success(), "Missing kubeconfig should fail");
    assert!(stderr.contains("Failed to establish cluster access"), "{stderr}");
    assert!(!stdout.contains('┌'), "No table should be printed");
}

/// Test that a broken config file is reported before connecting
#[test]
fn test_invalid_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{not json").unwrap();

    let output = ktop()
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("Failed to parse config file"), "{stderr}");
}
