//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test gets
//! its own data directory through `ROUNDCLOCK_DATA_DIR`.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command against `data_dir` and return (stdout, stderr, code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "roundclock-cli", "--"])
        .args(args)
        .env("ROUNDCLOCK_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let stdout = run_ok(data_dir, args);
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

/// The trailing state snapshot of a timer command's output.
fn state(events: &Value) -> &Value {
    let last = events.as_array().and_then(|a| a.last()).expect("events array");
    assert_eq!(last["type"], "StateSnapshot");
    last
}

fn has_event(events: &Value, kind: &str) -> bool {
    events
        .as_array()
        .is_some_and(|a| a.iter().any(|e| e["type"] == kind))
}

#[test]
fn test_config_path_uses_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_ok(dir.path(), &["config", "path"]);
    assert_eq!(stdout.trim(), dir.path().join("config.toml").display().to_string());
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(dir.path(), &["config", "get", "workout.rounds"]).trim(), "1");
    assert_eq!(run_ok(dir.path(), &["config", "set", "workout.rounds", "4"]).trim(), "ok");
    assert_eq!(run_ok(dir.path(), &["config", "get", "workout.rounds"]).trim(), "4");

    let config = run_json(dir.path(), &["config", "show"]);
    assert_eq!(config["workout"]["rounds"], 4);
    assert_eq!(config["max_intervals"], 10);
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "workout.color"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "workout.rounds", "many"]);
    assert_ne!(code, 0);
}

#[test]
fn test_intervals_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let list = run_json(dir.path(), &["intervals", "list"]);
    assert_eq!(list.as_array().unwrap().len(), 2);

    let list = run_json(dir.path(), &["intervals", "add", "Cooldown", "1m30s"]);
    let items = list.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2]["title"], "Cooldown");
    assert_eq!(items[2]["duration_ms"], 90_000);
    assert_eq!(items[2]["order"], 2);
}

#[test]
fn test_intervals_limit_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["config", "set", "max_intervals", "2"]);
    let (_, stderr, code) = run_cli(dir.path(), &["intervals", "add", "Extra", "10s"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("maximum of 2"));
}

#[test]
fn test_intervals_move_update_remove() {
    let dir = tempfile::tempdir().unwrap();
    let list = run_json(dir.path(), &["intervals", "move", "1", "--to", "0"]);
    assert_eq!(list[0]["title"], "Rest");
    assert_eq!(list[0]["order"], 0);

    let list = run_json(
        dir.path(),
        &["intervals", "update", "0", "--title", "Recover", "--duration", "15s"],
    );
    assert_eq!(list[0]["title"], "Recover");
    assert_eq!(list[0]["duration_ms"], 15_000);

    let id = list[1]["id"].as_str().unwrap().to_string();
    let list = run_json(dir.path(), &["intervals", "remove", &id]);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (_, _, code) = run_cli(dir.path(), &["intervals", "remove", "5"]);
    assert_ne!(code, 0);
}

#[test]
fn test_timer_status_when_idle() {
    let dir = tempfile::tempdir().unwrap();
    let events = run_json(dir.path(), &["timer", "status"]);
    let snapshot = state(&events);
    assert_eq!(snapshot["status"], "stopped");
    assert_eq!(snapshot["index"], 0);
    assert_eq!(snapshot["title"], "Work");
    assert_eq!(snapshot["remaining_ms"], 20_000);
}

#[test]
fn test_timer_start_pause_stop() {
    let dir = tempfile::tempdir().unwrap();
    let events = run_json(dir.path(), &["timer", "start"]);
    assert!(has_event(&events, "TimerStarted"));
    assert_eq!(state(&events)["status"], "running");

    let events = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(state(&events)["status"], "running");

    let events = run_json(dir.path(), &["timer", "pause"]);
    assert!(has_event(&events, "TimerPaused"));
    assert_eq!(state(&events)["status"], "paused");

    let events = run_json(dir.path(), &["timer", "stop"]);
    assert!(has_event(&events, "TimerStopped"));
    assert_eq!(state(&events)["status"], "stopped");
}

#[test]
fn test_timer_skip_moves_to_next_interval() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["timer", "start"]);
    let events = run_json(dir.path(), &["timer", "skip"]);
    assert!(has_event(&events, "IntervalSkipped"));
    assert!(has_event(&events, "Transition"));
    assert_eq!(state(&events)["index"], 1);
    assert_eq!(state(&events)["title"], "Rest");
}

#[test]
fn test_editing_intervals_resets_session() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["timer", "start"]);
    run_ok(dir.path(), &["intervals", "add", "Cooldown", "60"]);
    let events = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(state(&events)["status"], "stopped");
}
