use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_convert_same_group() {
    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("convert").arg("2").arg("tablespoons").arg("ml");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2 tbsp = 30 ml"));
}

#[test]
fn test_cli_convert_across_groups_needs_ingredient() {
    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("convert").arg("1").arg("cup").arg("g");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("try --ingredient"));
}

#[test]
fn test_cli_convert_bridges_with_conversions() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("conversions.json");
    fs::write(&table, r#"{"flour": {"gramsPerCup": 120}}"#).unwrap();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("convert")
        .arg("1/2")
        .arg("cup")
        .arg("g")
        .arg("--ingredient")
        .arg("flour")
        .arg("--conversions")
        .arg(&table);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1/2 cup = 60 g"));

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("convert")
        .arg("0.5")
        .arg("cup")
        .arg("g")
        .arg("--ingredient")
        .arg("flour")
        .arg("--conversions")
        .arg(&table);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1/2 cup = 60 g"));
}

#[test]
fn test_cli_convert_unknown_ingredient() {
    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("convert")
        .arg("1")
        .arg("clove")
        .arg("g")
        .arg("--ingredient")
        .arg("garlic");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("garlic"));
}
