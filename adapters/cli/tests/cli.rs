use std::process::{Command, Output};

fn gridlock(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gridlock"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run the gridlock binary")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is json")
}

#[test]
fn catalog_summary_lists_every_world() {
    let output = gridlock(&["catalog"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 10);
    assert!(stdout.contains("First Steps"));
}

#[test]
fn daily_output_is_reproducible() {
    let first = json_stdout(&gridlock(&["daily", "--date", "2025-01-01", "--archive"]));
    let second = json_stdout(&gridlock(&["daily", "--date", "2025-01-01", "--archive"]));
    assert_eq!(first, second);
    assert_eq!(first["puzzle"]["id"]["date"], "2025-01-01");
    assert_eq!(first["archive"].as_array().map(Vec::len), Some(7));
}

#[test]
fn default_levels_validate() {
    let report = json_stdout(&gridlock(&["validate", "--world", "1", "--level", "15"]));
    assert_eq!(report["solvable"], true);
}

#[test]
fn scripted_session_completes_the_first_level() {
    let outcome = json_stdout(&gridlock(&[
        "simulate", "--world", "1", "--level", "1", "--lines", "1,1",
    ]));
    assert_eq!(outcome["state"]["Succeeded"]["stars_earned"], 3);
    assert_eq!(outcome["summary"]["moves_used"], 2);
    assert_eq!(outcome["progress"]["attempts"], 1);
}

#[test]
fn unknown_levels_are_reported() {
    let output = gridlock(&["validate", "--world", "11", "--level", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no world 11"));
}

#[test]
fn missing_config_file_is_reported() {
    let output = gridlock(&["catalog", "--config", "/nonexistent/gridlock.toml"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read config file"));
}
