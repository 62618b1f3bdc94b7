use crate::common::workspace;
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_list() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("list").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Workspace contains 1 files, 1 recipes"))
        .stdout(predicate::str::contains("brownies"))
        .stdout(predicate::str::contains("Fudgy Brownies"));
}

#[test]
fn test_cli_show() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("show").arg("brownies").arg("--dir").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Recipe: brownies"))
        .stdout(predicate::str::contains("tokens (5):"))
        .stdout(predicate::str::contains("    - wheat: all-purpose flour (default)"))
        .stdout(predicate::str::contains("gluten-free: available"))
        .stdout(predicate::str::contains("egg-free: cannot be met"))
        .stdout(predicate::str::contains("dairy-free: cannot be met"));
}

#[test]
fn test_cli_show_unknown_recipe() {
    let dir = workspace();

    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("show").arg("cookies").arg("--dir").arg(dir.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Recipe 'cookies' not found"));
}
