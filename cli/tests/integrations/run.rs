use crate::common::workspace;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_cli_run_renders_sections_and_steps() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run").arg("brownies").arg("--dir").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Fudgy Brownies"))
        .stdout(predicate::str::contains("Dry"))
        .stdout(predicate::str::contains("- 1/2 cup all-purpose flour"))
        .stdout(predicate::str::contains("or: almond flour"))
        .stdout(predicate::str::contains("- 2 eggs"))
        .stdout(predicate::str::contains("1. Whisk the melted butter with the sugar and egg."))
        .stdout(predicate::str::contains("3. Bake for 25 minutes."));
}

#[test]
fn test_cli_run_raw_with_multiplier() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run")
        .arg("brownies")
        .arg("--multiplier")
        .arg("2")
        .arg("--raw")
        .arg("--dir")
        .arg(dir.path());

    cmd.assert().success().stdout(predicate::str::starts_with(
        "1 cup all-purpose flour\n2/3 cup cocoa powder\n2 cups sugar\n4 eggs\n1 cup melted butter\n\n",
    ));
}

#[test]
fn test_cli_run_restriction_swaps_choice() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run")
        .arg("brownies")
        .arg("--restrict")
        .arg("gluten-free")
        .arg("--raw")
        .arg("--dir")
        .arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1/2 cup almond flour"))
        .stdout(predicate::str::contains("Fold in the almond flour and cocoa powder."));
}

#[test]
fn test_cli_run_choose_and_unit() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run")
        .arg("brownies")
        .arg("-c")
        .arg("flour=almond")
        .arg("-u")
        .arg("butter=tbsp")
        .arg("--raw")
        .arg("--dir")
        .arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1/2 cup almond flour"))
        .stdout(predicate::str::contains("8 tbsp melted butter"));
}

#[test]
fn test_cli_run_pan_scaling() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run")
        .arg("brownies")
        .arg("--pan")
        .arg("8sq:8x16")
        .arg("--raw")
        .arg("--dir")
        .arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 cup all-purpose flour"));
}

#[test]
fn test_cli_run_unknown_choice_option() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run")
        .arg("brownies")
        .arg("-c")
        .arg("flour=rye")
        .arg("--dir")
        .arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no option 'rye'"))
        .stderr(predicate::str::contains("wheat, almond"));
}

#[test]
fn test_cli_run_nonexistent_recipe() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run").arg("blondies").arg("--dir").arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_cli_run_malformed_recipe() {
    let dir = workspace();
    fs::write(
        dir.path().join("broken.json"),
        "{\n  \"id\": \"broken\",\n  \"tokenOrder\": \"flour\"\n}",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run").arg("brownies").arg("--dir").arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"))
        .stderr(predicate::str::contains("broken.json"));
}

#[test]
fn test_cli_run_rejects_bad_multiplier() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run")
        .arg("brownies")
        .arg("--multiplier")
        .arg("-1")
        .arg("--dir")
        .arg(dir.path());

    cmd.assert().failure();
}

#[test]
fn test_cli_run_without_recipe_shows_usage() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("run").arg("--dir").arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No recipe specified"));
}
