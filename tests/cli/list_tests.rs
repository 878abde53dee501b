use super::support::TestContext;
use predicates::prelude::*;

#[test]
fn test_list_empty_directory() {
    let ctx = TestContext::new();
    ctx.command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No plugin archives found"));
}

#[test]
fn test_list_shows_manifest() {
    let ctx = TestContext::new();
    ctx.add_package(
        "greeter.pkg",
        "name = \"greeter\"\nversion = \"0.3.1\"\ndescription = \"Says hello\"\ntypes = [\"greeter.Greet\"]\n",
    );

    ctx.command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("greeter"))
        .stdout(predicate::str::contains("v0.3.1"))
        .stdout(predicate::str::contains("Says hello"))
        .stdout(predicate::str::contains("greeter.Greet"));
}

#[test]
fn test_list_reports_invalid_archive() {
    let ctx = TestContext::new();
    std::fs::write(ctx.plugins_dir().join("broken.pkg"), b"not a zip").unwrap();

    ctx.command()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid"))
        .stdout(predicate::str::contains("broken.pkg"));
}

#[test]
fn test_list_json_is_valid() {
    let ctx = TestContext::new();
    ctx.add_package("a.pkg", "name = \"a\"\nversion = \"1.0.0\"\n");
    std::fs::write(ctx.plugins_dir().join("b.pkg"), b"garbage").unwrap();

    let output = ctx.command().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = listing.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["manifest"]["name"], "a");
    assert!(entries[0].get("error").is_none());
    assert!(entries[1]["error"].is_string());
}
