//! Integration test: demo binary startup failures are reported.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run_demo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_servo_demo"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn combined(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[test]
fn missing_config_is_logged() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("absent.toml");
    let output = run_demo(&["--config", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let text = combined(&output);
    assert!(text.contains("Servo demo failed"), "{text}");
    assert!(text.contains("Configuration file not found"), "{text}");
}

#[test]
fn malformed_config_is_logged() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fleet.toml");
    fs::write(&path, "[[actuators]\nid = 0").unwrap();
    let output = run_demo(&["--config", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let text = combined(&output);
    assert!(text.contains("Failed to parse configuration"), "{text}");
}

#[test]
fn overflowing_pulse_config_is_logged() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fleet.toml");
    fs::write(
        &path,
        "[[actuators]]\nid = 0\nchannel = 0\nresolution_bits = 20\nfrequency_hz = 40000000\nmin_pulse_us = 1000000\npulse_range_us = 1000000\n",
    )
    .unwrap();
    let output = run_demo(&["--config", path.to_str().unwrap(), "--json"]);

    assert_eq!(output.status.code(), Some(1));
    let text = combined(&output);
    assert!(text.contains("overflow duty arithmetic"), "{text}");
}
