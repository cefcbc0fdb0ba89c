//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the development data
//! directory and verify outputs.

use std::process::Command;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// All tests share one on-disk store, and `alarm add` assigns ids with
/// a read-modify-write, so the suite must not run commands in parallel.
fn store_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "wakeful-cli", "--"])
        .args(args)
        .env("WAKEFUL_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_alarm_add_and_list() {
    let _guard = store_lock();
    let (stdout, _, code) = run_cli(&["alarm", "add", "07:30", "--repeat", "daily"]);
    assert_eq!(code, 0, "alarm add failed");
    let created: serde_json::Value = serde_json::from_str(&stdout).expect("add output not JSON");
    assert_eq!(created["hour"], 7);
    assert_eq!(created["minute"], 30);

    let (stdout, _, code) = run_cli(&["alarm", "list", "--json"]);
    assert_eq!(code, 0, "alarm list failed");
    let alarms: serde_json::Value = serde_json::from_str(&stdout).expect("list output not JSON");
    assert!(!alarms.as_array().unwrap().is_empty());
}

#[test]
fn test_alarm_add_rejects_bad_time() {
    let _guard = store_lock();
    let (_, _, code) = run_cli(&["alarm", "add", "25:00"]);
    assert_ne!(code, 0, "out-of-range time was accepted");
}

#[test]
fn test_alarm_disable_enable_remove() {
    let _guard = store_lock();
    let (stdout, _, code) = run_cli(&["alarm", "add", "06:15", "--repeat", "weekend"]);
    assert_eq!(code, 0);
    let created: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let id = created["id"].as_u64().unwrap().to_string();

    let (_, _, code) = run_cli(&["alarm", "disable", &id]);
    assert_eq!(code, 0, "alarm disable failed");
    let (_, _, code) = run_cli(&["alarm", "enable", &id]);
    assert_eq!(code, 0, "alarm enable failed");
    let (_, _, code) = run_cli(&["alarm", "remove", &id]);
    assert_eq!(code, 0, "alarm remove failed");
}

#[test]
fn test_next_for_unknown_id_fails() {
    let _guard = store_lock();
    let (_, stderr, code) = run_cli(&["next", "999999"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no alarm"));
}

#[test]
fn test_next_without_id() {
    let _guard = store_lock();
    let (_, _, code) = run_cli(&["next"]);
    assert_eq!(code, 0, "next failed");
}

#[test]
fn test_config_list() {
    let _guard = store_lock();
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("config not JSON");
    assert!(parsed.get("defaults").is_some());
}

#[test]
fn test_config_get_set() {
    let _guard = store_lock();
    let (_, _, code) = run_cli(&["config", "set", "defaults.max_snoozes", "4"]);
    assert_eq!(code, 0, "config set failed");
    let (stdout, _, code) = run_cli(&["config", "get", "defaults.max_snoozes"]);
    assert_eq!(code, 0, "config get failed");
    assert_eq!(stdout.trim(), "4");
}

#[test]
fn test_config_unknown_key_fails() {
    let _guard = store_lock();
    let (_, _, code) = run_cli(&["config", "get", "nonsense.key"]);
    assert_ne!(code, 0);
}

#[test]
fn test_simulate_fire_with_snoozes() {
    let _guard = store_lock();
    let (stdout, _, code) = run_cli(&["alarm", "add", "05:45", "--repeat", "daily"]);
    assert_eq!(code, 0);
    let created: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let id = created["id"].as_u64().unwrap().to_string();

    let (stdout, _, code) = run_cli(&["simulate", "fire", &id, "--snoozes", "1"]);
    assert_eq!(code, 0, "simulate fire failed");
    assert!(stdout.contains("AlarmFired"));
    assert!(stdout.contains("AlarmSnoozed"));
    assert!(stdout.contains("AlarmStopped"));

    let _ = run_cli(&["alarm", "remove", &id]);
}

#[test]
fn test_simulate_boot() {
    let _guard = store_lock();
    let (_, _, code) = run_cli(&["simulate", "boot"]);
    assert_eq!(code, 0, "simulate boot failed");
}
