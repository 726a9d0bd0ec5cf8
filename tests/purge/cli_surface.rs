//! Startup-surface tests running the real binary.
//!
//! All of these exit before any remote call, so they are safe without a
//! service to talk to.

use std::process::Command;

fn scour_command() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scour"));
    // Make the environment deterministic regardless of the host shell.
    cmd.env_remove("SCOUR_URL")
        .env_remove("SCOUR_TOKEN")
        .env_remove("SCOUR_LOG")
        .env_remove("SCOUR_LOG_FORMAT");
    cmd
}

#[test]
fn test_missing_url_is_fatal_before_any_remote_call() {
    let output = scour_command()
        .args(["project-1", "collection-1"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SCOUR_URL"),
        "diagnostic should name the missing variable; got: {}",
        stderr
    );
}

#[test]
fn test_missing_token_is_fatal_before_any_remote_call() {
    let output = scour_command()
        .env("SCOUR_URL", "https://discovery.example.internal")
        .args(["project-1", "collection-1"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SCOUR_TOKEN"), "got: {}", stderr);
}

#[test]
fn test_oversized_batch_size_is_rejected_at_startup() {
    let output = scour_command()
        .args(["project-1", "collection-1", "--batch-size", "5000"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("batch_size"), "got: {}", stderr);
}

#[test]
fn test_missing_positional_arguments_fail_parsing() {
    let output = scour_command().arg("project-only").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.to_lowercase().contains("collection"), "got: {}", stderr);
}
