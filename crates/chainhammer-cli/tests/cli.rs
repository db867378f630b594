use std::{fs, path::Path, process::Command};

use serde_json::Value;

fn chainhammer(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_chainhammer"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_trajectory(dir: &Path, json: &str) -> String {
    let path = dir.join("trajectory.json");
    fs::write(&path, json).unwrap();
    path.to_str().unwrap().to_owned()
}

fn stdout_json(output: &std::process::Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trajectory(dir.path(), r#"{"states": [0, 0, 1, 0, 1, 1, 1, 0]}"#);

    let report = stdout_json(&chainhammer(&["counts", &path]));
    assert_eq!(report["total_transitions"], 7);
    assert_eq!(report["counts"], serde_json::json!([[1, 2], [2, 2]]));
    assert_eq!(report["trajectory"]["num_states"], 2);
}

#[test]
fn test_perron_frobenius_with_symmetry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trajectory(dir.path(), r#"{"states": [0, 1], "num_states": 2}"#);

    let report = stdout_json(&chainhammer(&[
        "perron-frobenius",
        &path,
        "--symmetry",
        "perm:1,0",
    ]));
    assert_eq!(report["matrix"], serde_json::json!([[0.0, 1.0], [1.0, 0.0]]));
    assert_eq!(report["symmetries"], serde_json::json!(["perm:1,0"]));
    assert_eq!(report["degenerate_states"], serde_json::json!([]));
}

#[test]
fn test_generator_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trajectory(dir.path(), r#"{"states": [0, 0, 1, 1, 1, 0], "dt": 0.5}"#);
    let output = dir.path().join("generator.json");

    let result = chainhammer(&["generator", &path, "--output", output.to_str().unwrap()]);
    assert!(result.status.success());
    assert!(result.stdout.is_empty());

    let report: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["trajectory"]["dt"], 0.5);
    let rate = report["matrix"][1][0].as_f64().unwrap();
    assert!((rate - 1.0 / 1.5).abs() < 1e-12);
    assert!(report.get("symmetries").is_none());
}

#[test]
fn test_holding_times_with_histogram() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trajectory(dir.path(), r#"{"states": [2, 2, 2], "num_states": 3}"#);

    let report = stdout_json(&chainhammer(&["holding-times", &path, "--bins", "2"]));
    let states = report["states"].as_array().unwrap();
    assert_eq!(states.len(), 3);
    assert_eq!(states[0]["durations"], serde_json::json!([]));
    assert!(states[0].get("histogram").is_none());
    assert_eq!(states[2]["durations"], serde_json::json!([3.0]));
    assert_eq!(states[2]["histogram"]["bin_weights"], serde_json::json!([0.0, 1.0]));
}

#[test]
fn test_malformed_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trajectory(dir.path(), r#"{"states": [0, 3], "num_states": 2}"#);

    let result = chainhammer(&["counts", &path]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("trajectory.json"));
}

#[test]
fn test_symmetry_mismatch_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trajectory(dir.path(), r#"{"states": [0, 1, 2]}"#);

    let result = chainhammer(&["generator", &path, "--symmetry", "perm:1,0"]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("symmetry #0"));
}

#[test]
fn test_huge_shift_is_reduced_modulo_state_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trajectory(dir.path(), r#"{"states": [0, 1, 2, 0]}"#);
    let huge = format!("shift:{}", usize::MAX);

    let pooled = stdout_json(&chainhammer(&["perron-frobenius", &path, "--symmetry", &huge]));
    let unpooled = stdout_json(&chainhammer(&["perron-frobenius", &path]));
    // usize::MAX is a multiple of 3, so the shift is the identity
    assert_eq!(pooled["matrix"], unpooled["matrix"]);
}

#[test]
fn test_huge_label_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_trajectory(dir.path(), r#"{"states": [0, 4294967296]}"#);

    let result = chainhammer(&["counts", &path]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("exceeds the limit"));
}
