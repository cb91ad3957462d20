//! CLI integration tests

use std::process::{Command, Output};
use tempfile::TempDir;

const ANSWERS: &str = r#"{
    "Sex": "Male", "Age": "40-44", "Education": "College graduate",
    "Income": "Over $75000", "HighBP": "No", "HighChol": "No", "CholCheck": "Yes",
    "BMI": 22, "HealthScore": 5, "Smoker": "No", "Stroke": "No",
    "HeartDiseaseorAttack": "No", "HvyAlcoholConsump": "No", "AnyHealthcare": "Yes",
    "NoDocbcCost": "No", "DiffWalk": "No", "GenHlth": 1, "MentHlth": 0, "PhysHlth": 0
}"#;

fn dsq(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dsq"))
        .args(args)
        // Keep a user config file from changing the output format
        .env("HOME", env!("CARGO_TARGET_TMPDIR"))
        .env_remove("DSQ_API_URL")
        .output()
        .expect("Failed to execute command")
}

fn write_answers(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("answers.json");
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = dsq(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Diabetes Survey Predictor"),
        "Should show app name"
    );
    assert!(stdout.contains("questions"), "Should show questions command");
    assert!(stdout.contains("encode"), "Should show encode command");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("model"), "Should show model command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = dsq(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("dsq"), "Should show binary name");
}

#[test]
fn test_predict_help() {
    let output = dsq(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--input"), "Should show input option");
}

#[test]
fn test_questions_lists_every_field() {
    let output = dsq(&["questions"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for field in ["Sex", "Age", "Education", "Income", "BMI", "PhysHlth"] {
        assert!(stdout.contains(field), "Should list {}", field);
    }
    assert!(stdout.contains("Over 80 Years"));
}

#[test]
fn test_questions_json() {
    let output = dsq(&["--format", "json", "questions"]);
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["fields"].as_array().unwrap().len(), 19);
    assert_eq!(schema["fields"][7]["name"], "BMI");
    assert_eq!(schema["classes"][1], "Prediabetes");
}

#[test]
fn test_encode_example_answers() {
    let dir = TempDir::new().unwrap();
    let path = write_answers(&dir, ANSWERS);

    let output = dsq(&["--format", "json", "encode", "--input", &path]);
    assert!(output.status.success(), "encode should succeed");

    let encoded: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let features: Vec<f64> = encoded["features"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(
        features,
        vec![1.0, 5.0, 6.0, 8.0, 0.0, 0.0, 1.0, 22.0, 5.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
    );
    assert_eq!(encoded["feature_order"][0], "Sex");
}

#[test]
fn test_encode_rejects_empty_age() {
    let dir = TempDir::new().unwrap();
    let path = write_answers(&dir, &ANSWERS.replace(r#""40-44""#, r#""""#));

    let output = dsq(&["encode", "--input", &path]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "empty Age must fail");
    assert!(stderr.contains("Age"), "Should name the failing field");
}

#[test]
fn test_predict_against_unreachable_server_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_answers(&dir, ANSWERS);

    let output = dsq(&["--api-url", "http://127.0.0.1:1", "predict", "--input", &path]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_command() {
    let output = dsq(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}
