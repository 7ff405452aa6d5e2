use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_debrief")
}

fn fixture() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sample_debriefing.json")
        .to_string_lossy()
        .into_owned()
}

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("debrief-{name}-{stamp}.{ext}"))
}

#[test]
fn missing_subcommand_prints_usage() {
    let output = Command::new(bin()).output().expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: debrief"));
}

#[test]
fn link_command_emits_outcome_json() {
    let output = Command::new(bin())
        .args(["link", fixture().as_str()])
        .output()
        .expect("link should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let payload: serde_json::Value = serde_json::from_str(&stdout).expect("link should emit json");
    assert_eq!(payload["chains"].as_array().map(Vec::len), Some(4));
    assert_eq!(payload["leftover_launches"].as_array().map(Vec::len), Some(1));
    assert_eq!(payload["leftover_impacts"].as_array().map(Vec::len), Some(0));
    assert_eq!(payload["chains"][0]["method"], "deterministic");
}

#[test]
fn link_table_lists_chains_and_unlinked_shots() {
    let output = Command::new(bin())
        .args(["link", fixture().as_str(), "--table", "--limit", "5"])
        .output()
        .expect("link should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Chain: Pilot=Viper, Weapon=AIM-120C"));
    assert!(stdout.contains("SplashKills=1"));
    assert!(stdout.contains("Unlinked Shots: 1"));
}

#[test]
fn link_command_returns_usage_without_path() {
    let output = Command::new(bin())
        .arg("link")
        .output()
        .expect("link should run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: debrief link"));
}

#[test]
fn link_command_fails_on_unreadable_log() {
    let output = Command::new(bin())
        .args(["link", "/nonexistent/debrief.json"])
        .output()
        .expect("link should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("load failed"));
}

#[test]
fn config_file_overrides_linker_settings() {
    let path = unique_temp_path("config", "yaml");
    fs::write(&path, "hit_kill_tolerance: 0.01\n").expect("config should be written");

    let output = Command::new(bin())
        .args(["link", fixture().as_str(), "--config", path.to_string_lossy().as_ref()])
        .output()
        .expect("link should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("link should emit json");
    assert_eq!(payload["leftover_destructions"].as_array().map(Vec::len), Some(2));

    let _ = fs::remove_file(path);
}

#[test]
fn unknown_config_key_is_rejected() {
    let path = unique_temp_path("bad-config", "yaml");
    fs::write(&path, "kill_window: 3\n").expect("config should be written");

    let output = Command::new(bin())
        .args(["link", fixture().as_str(), "--config", path.to_string_lossy().as_ref()])
        .output()
        .expect("link should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config error"));

    let _ = fs::remove_file(path);
}

#[test]
fn stats_command_prints_pilots_and_aa_kills() {
    let output = Command::new(bin())
        .args(["stats", fixture().as_str()])
        .output()
        .expect("stats should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Human pilots: Hog, Viper"));
    assert!(stdout.contains("Viper: 2 shots, 1 hits, 1 kills 00:01:15"));
    assert!(stdout.contains("Total A-A kills: 1"));
}

#[test]
fn report_command_emits_pilot_view_model() {
    let output = Command::new(bin())
        .args(["report", fixture().as_str()])
        .output()
        .expect("report should run");

    assert_eq!(output.status.code(), Some(0));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("report should emit json");
    assert_eq!(payload["pilots"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["pilots"][1]["pilot"], "Viper");
    assert_eq!(payload["pilots"][1]["flightTime"], "00:01:15");
}

#[test]
fn export_command_writes_csv() {
    let out = unique_temp_path("export", "csv");

    let output = Command::new(bin())
        .args(["export", fixture().as_str(), out.to_string_lossy().as_ref()])
        .output()
        .expect("export should run");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("exported 4 chain(s)"));
    let csv = fs::read_to_string(&out).expect("csv should exist");
    assert_eq!(csv.lines().count(), 5);

    let _ = fs::remove_file(out);
}

#[test]
fn batch_reports_each_file_and_fails_on_missing_one() {
    let output = Command::new(bin())
        .args([
            "batch",
            fixture().as_str(),
            "/nonexistent/debrief.json",
            "--workers",
            "2",
        ])
        .output()
        .expect("batch should run");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("chains=4 hits=4 kills=2 splash=1"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/nonexistent/debrief.json\terror:"));
}
