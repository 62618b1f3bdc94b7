use assert_cmd::Command;

#[test]
fn test_server_command_available() {
    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicates::str::contains("server"));
}

#[test]
fn test_server_rejects_bad_host() {
    let mut cmd = Command::cargo_bin("larder").unwrap();
    cmd.arg("server")
        .arg("--dir")
        .arg(tempfile::TempDir::new().unwrap().path())
        .arg("--host")
        .arg("not a host");

    cmd.assert().failure();
}
