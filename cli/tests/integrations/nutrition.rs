use crate::common::workspace;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_cli_nutrition_table() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("nutrition")
        .arg("brownies")
        .arg("--meal")
        .arg("snack")
        .arg("--dir")
        .arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Nutrition for brownies (snack)"))
        .stdout(predicate::str::contains("Coverage: 5/5 ingredients (complete)"))
        .stdout(predicate::str::contains("Suggested servings:"))
        .stdout(predicate::str::contains("Energy"))
        .stdout(predicate::str::contains("Added sugar"));
}

#[test]
fn test_cli_nutrition_raw_json() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("nutrition")
        .arg("brownies")
        .arg("--raw")
        .arg("--dir")
        .arg(dir.path());

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    // 1/2 cup butter is 8 tbsp of the tablespoon serving
    let kcal = json["batchTotals"]["totals"]["kcal"].as_f64().unwrap();
    let expected = 227.5 + 196.0 / 3.0 + 774.0 + 144.0 + 816.0;
    assert!((kcal - expected).abs() < 1e-6);
    assert_eq!(json["batchTotals"]["complete"], true);
    assert!(json["servingsEstimate"].is_u64());
    assert_eq!(json["debugTargets"]["meal"], "dinner");
}

#[test]
fn test_cli_nutrition_config_pins_serving_range() {
    let dir = workspace();
    let config = dir.path().join("larder-config.json");
    fs::write(&config, r#"{"policy": {"minServings": 4, "maxServings": 4}}"#).unwrap();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("nutrition")
        .arg("brownies")
        .arg("--config")
        .arg(&config)
        .arg("--dir")
        .arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Suggested servings: 4"));
}

#[test]
fn test_cli_nutrition_rejects_empty_serving_range() {
    let dir = workspace();
    let config = dir.path().join("larder-config.json");
    fs::write(&config, r#"{"policy": {"minServings": 0}}"#).unwrap();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("nutrition")
        .arg("brownies")
        .arg("--config")
        .arg(&config)
        .arg("--dir")
        .arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("serving range"));
}

#[test]
fn test_cli_nutrition_incomplete_batch() {
    let dir = workspace();
    fs::write(
        dir.path().join("toast.json"),
        r#"{"id": "toast", "tokenOrder": ["bread"],
            "ingredients": {"bread": {"options": [{"display": "bread", "ratio": "2", "unit": "slices"}]}}}"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("nutrition").arg("toast").arg("--dir").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Coverage: 0/1 ingredients (missing: bread)"))
        .stdout(predicate::str::contains("not estimated"));
}
