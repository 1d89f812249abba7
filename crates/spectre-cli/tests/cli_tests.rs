// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn scenario_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write scenario");
    file
}

fn spectre() -> Command {
    Command::cargo_bin("spectre").expect("spectre binary")
}

fn run_report(json: &str, ticks: u32) -> serde_json::Value {
    let file = scenario_file(json);
    let output = spectre()
        .args(["run", "--compact", "--ticks", &ticks.to_string(), "--scenario"])
        .arg(file.path())
        .output()
        .expect("run spectre");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("report JSON")
}

#[test]
fn config_prints_defaults() {
    spectre()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"gravity\": -9.8"))
        .stdout(predicate::str::contains("\"projectile_substeps\": 16"));
}

#[test]
fn projectile_hits_static_box_on_first_tick() {
    let report = run_report(
        r#"{
            "bodies": [
                { "kind": "model", "position": [4.5, 10, 0], "half_extent": 0.5, "static": true }
            ],
            "projectiles": [
                { "origin": [0, 10, 0], "direction": [1, 0, 0], "speed": 500 }
            ]
        }"#,
        1,
    );
    let events = report["events"].as_array().expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"], "projectile_hit");
    assert_eq!(events[0]["tick"], 1);
    assert_eq!(events[0]["target"], 1);
    let x = events[0]["point"][0].as_f64().expect("x");
    assert!((4.0..=5.0).contains(&x));
    assert_eq!(report["projectiles_in_flight"], 0);
}

#[test]
fn dropped_cube_settles_on_flat_terrain() {
    let report = run_report(
        r#"{
            "terrain": { "kind": "flat", "height": 2.0 },
            "bodies": [
                { "kind": "model", "position": [0, 3, 0], "half_extent": 0.5, "renderable": 3 }
            ]
        }"#,
        300,
    );
    assert_eq!(report["ticks"], 300);
    let body = &report["bodies"][0];
    assert_eq!(body["kind"], "dynamic");
    assert_eq!(body["grounded"], true);
    let y = body["position"][1].as_f64().expect("y");
    assert!((y - 2.0).abs() < 1e-5, "y = {y}");
    assert_eq!(report["renderables"][0]["id"], 3);
}

#[test]
fn missing_scenario_file_fails() {
    spectre()
        .args(["run", "--scenario", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn non_positive_dt_is_rejected() {
    let file = scenario_file("{}");
    spectre()
        .args(["run", "--dt", "0", "--scenario"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dt"));
}

#[test]
fn invalid_config_is_reported() {
    let file = scenario_file(r#"{ "config": { "damping": 2.0 } }"#);
    spectre()
        .args(["run", "--scenario"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid physics config"));
}
