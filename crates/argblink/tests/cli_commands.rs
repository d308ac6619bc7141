#![cfg(feature = "cli")]

use std::process::{Command, Output};

fn argblink(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_argblink"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("ARGBLINK_PORT")
        .output()
        .expect("argblink binary should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn encode_read_prints_envelope() {
    let output = argblink(&["--format", "raw", "encode", "read"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "BEGIN 0 END");
}

#[test]
fn encode_fill_prints_packed_colors() {
    let output = argblink(&[
        "--format", "raw", "encode", "fill", "--color", "#0000ff", "--leds", "3", "--delay", "25",
    ]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "BEGIN 1 1 25 31 31 31 END");
}

#[test]
fn encode_fill_json_reports_type_and_word_count() {
    let output = argblink(&[
        "--format", "json", "encode", "fill", "--color", "ffffff", "--leds", "2",
    ]);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("stdout should be JSON");
    assert_eq!(value["type"], 1);
    assert_eq!(value["words"], 7);
    assert_eq!(value["envelope"], "BEGIN 1 1 0 65535 65535 END");
}

#[test]
fn encode_pretty_prints_one_word_per_line() {
    let output = argblink(&["--format", "pretty", "encode", "read"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "BEGIN\n0\nEND\n");
}

#[test]
fn zero_frames_exits_with_usage() {
    let output = argblink(&[
        "encode", "fill", "--color", "ffffff", "--frames", "0",
    ]);

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("frames cannot be empty"));
}

#[test]
fn missing_port_exits_with_transport_error() {
    let output = argblink(&[
        "read",
        "/dev/argblink-missing-port",
        "--wait",
        "100ms",
    ]);

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("open failed"));
}

#[test]
fn version_prints_package_version() {
    let output = argblink(&["version"]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        format!("argblink {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_extended_includes_defaults() {
    let output = argblink(&["version", "--extended"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("name: argblink"));
    assert!(text.contains("defaults: baud=115200 word_delay=20ms read_timeout=100ms"));
}
