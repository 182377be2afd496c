// tests/cli.rs

//! End-to-end checks of the paths that finish before a window exists.

use std::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_xpopup");

#[test]
fn missing_message_prints_usage_on_a_terminal() {
    let mut session = rexpect::spawn(BIN, Some(5_000)).unwrap();
    session
        .exp_string("Usage: xpopup [-c] [-d duration] message")
        .unwrap();
    session.exp_eof().unwrap();
}

#[test]
fn missing_message_exits_with_failure() {
    let output = Command::new(BIN).args(["-c", "-d", "3"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"), "stderr was: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn unreachable_display_is_a_setup_failure() {
    let output = Command::new(BIN)
        .arg("hello")
        .env_remove("DISPLAY")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot open display"), "stderr was: {stderr}");
}
