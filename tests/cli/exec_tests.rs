use super::support::TestContext;
use predicates::prelude::*;

#[test]
fn test_exec_unknown_command_fails() {
    let ctx = TestContext::new();
    ctx.command()
        .args(["exec", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist"));
}

#[test]
fn test_exec_creates_missing_plugins_dir() {
    let ctx = TestContext::new();
    let missing = ctx.root().join("fresh");

    let mut cmd = assert_cmd::Command::cargo_bin("plugin-host").expect("Failed to find binary");
    cmd.current_dir(ctx.root())
        .arg("--plugins-dir")
        .arg(&missing)
        .args(["exec", "anything"])
        .assert()
        .failure();

    assert!(missing.is_dir());
}

#[test]
fn test_exec_survives_corrupt_package() {
    let ctx = TestContext::new();
    std::fs::write(ctx.plugins_dir().join("bad.pkg"), b"garbage").unwrap();

    ctx.command()
        .args(["exec", "greet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.pkg"))
        .stderr(predicate::str::contains("panicked").not());
}
