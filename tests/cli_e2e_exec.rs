//! End-to-end tests for the `monhang exec` command.
//!
//! Component directories are created by hand, so no git is needed.

#![cfg(unix)]

#[allow(dead_code)]
mod common;
use common::prelude::*;

const TWO_COMPONENTS: &str = r#"{
    "name": "workspace",
    "components": [
        {"name": "api", "source": "https://github.com/org/api.git"},
        {"name": "web", "source": "https://github.com/org/web.git"},
        {"name": "notes"}
    ]
}"#;

fn workspace() -> TestFixture {
    TestFixture::new()
        .with_manifest(TWO_COMPONENTS)
        .with_file("api/marker.txt", "api-marker")
        .with_file("web/marker.txt", "web-marker")
}

#[test]
fn test_exec_help() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("exec")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Run a command in every component directory",
        ))
        .stdout(predicate::str::contains("--parallel"))
        .stdout(predicate::str::contains("--live"));
}

#[test]
fn test_exec_runs_in_every_component() {
    let fixture = workspace();

    fixture
        .command()
        .args(["exec", "--", "cat", "marker.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("== api ok"))
        .stdout(predicate::str::contains("api-marker"))
        .stdout(predicate::str::contains("== web ok"))
        .stdout(predicate::str::contains("web-marker"))
        .stdout(predicate::str::contains("2 succeeded, 0 failed"));
}

#[test]
fn test_exec_skips_components_without_source() {
    let fixture = workspace();

    fixture
        .command()
        .args(["exec", "--", "pwd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("notes").not());
}

#[test]
fn test_exec_parallel() {
    let fixture = workspace();

    fixture
        .command()
        .args(["exec", "--parallel", "--", "cat", "marker.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api-marker"))
        .stdout(predicate::str::contains("web-marker"));
}

#[test]
fn test_exec_live_prefixes_lines() {
    let fixture = workspace();

    fixture
        .command()
        .args(["exec", "--live", "--", "cat", "marker.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[api] api-marker"))
        .stdout(predicate::str::contains("[web] web-marker"));
}

#[test]
fn test_exec_nonzero_exit_fails_the_run() {
    let fixture = TestFixture::new()
        .with_manifest(TWO_COMPONENTS)
        .with_file("api/marker.txt", "api-marker")
        .with_file("web/other.txt", "web");

    fixture
        .command()
        .args(["exec", "--", "cat", "marker.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("== web FAILED"))
        .stdout(predicate::str::contains("1 succeeded, 1 failed"))
        .stderr(predicate::str::contains("1 of 2 components failed"));
}

#[test]
fn test_exec_missing_program_is_reported() {
    let fixture = workspace();

    fixture
        .command()
        .args(["exec", "--", "monhang-no-such-program"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to start"));
}

#[test]
fn test_exec_does_not_use_a_shell() {
    let fixture = workspace();

    fixture
        .command()
        .args(["exec", "--", "echo", "a", "|", "wc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a | wc"));
}
