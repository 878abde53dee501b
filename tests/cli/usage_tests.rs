use predicates::prelude::*;

#[test]
fn test_help_flag() {
    let mut cmd = assert_cmd::Command::cargo_bin("plugin-host").expect("Failed to find binary");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin-host"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_subcommands_listed_in_help() {
    let mut cmd = assert_cmd::Command::cargo_bin("plugin-host").expect("Failed to find binary");
    cmd.arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_flag() {
    let mut cmd = assert_cmd::Command::cargo_bin("plugin-host").expect("Failed to find binary");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_completions_bash() {
    let mut cmd = assert_cmd::Command::cargo_bin("plugin-host").expect("Failed to find binary");
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugin-host"));
}

#[test]
fn test_missing_subcommand_fails() {
    let mut cmd = assert_cmd::Command::cargo_bin("plugin-host").expect("Failed to find binary");
    cmd.assert().failure();
}
