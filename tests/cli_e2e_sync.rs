//! End-to-end tests for the `monhang sync` and `monhang boot` commands.
//!
//! Tests that clone need a `git` binary and are gated behind the
//! `integration-tests` feature. The origin repositories are local and reached
//! through `file://` URLs, so no network access is required.

#[allow(dead_code)]
mod common;
use common::prelude::*;
use common::git_output;

fn component_manifest(components: &[(&str, String)]) -> String {
    let entries: Vec<String> = components
        .iter()
        .map(|(name, source)| format!(r#"{{"name": "{}", "source": "{}"}}"#, name, source))
        .collect();
    format!(
        r#"{{"name": "workspace", "components": [{}]}}"#,
        entries.join(", ")
    )
}

#[test]
fn test_sync_help() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("sync")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Clone or update every component declared in the manifest",
        ))
        .stdout(predicate::str::contains("--parallel"))
        .stdout(predicate::str::contains("--jobs"))
        .stdout(predicate::str::contains("--no-progress"));
}

#[test]
fn test_sync_without_sources_is_a_no_op() {
    let fixture = TestFixture::new()
        .with_manifest(r#"{"name": "workspace", "components": [{"name": "notes"}]}"#);

    fixture
        .command()
        .args(["sync", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No components with a source"));
    assert!(!fixture.path().join("notes").exists());
}

#[test]
fn test_boot_dry_run_prints_dependency_order() {
    let fixture = TestFixture::new().with_manifest(manifests::PROJECT);

    fixture
        .command()
        .args(["boot", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Boot order for app:"))
        .stdout(predicate::str::contains(
            "1. lib @ v0.3.0 https://git.example.com/lib.git",
        ))
        .stdout(predicate::str::contains(
            "2. runtime @ default branch https://git.example.com/runtime.git",
        ))
        .stdout(predicate::str::contains(
            "3. app @ v1.0.0 https://git.example.com/app.git",
        ));
    assert!(!fixture.path().join("lib").exists());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_clones_then_updates() {
    let origin = OriginRepo::new();
    let fixture = TestFixture::new()
        .with_manifest(&component_manifest(&[("core", origin.url(""))]));

    fixture
        .command()
        .args(["sync", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cloned"))
        .stdout(predicate::str::contains("1 cloned, 0 updated, 0 failed"));

    let clone = fixture.path().join("core");
    assert!(clone.join(".git").exists());
    assert_eq!(std::fs::read_to_string(clone.join("README.md")).unwrap(), "second");

    origin.commit("README.md", "third", "Third commit");

    fixture
        .command()
        .args(["sync", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 cloned, 1 updated, 0 failed"));
    assert_eq!(std::fs::read_to_string(clone.join("README.md")).unwrap(), "third");
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_checks_out_requested_version() {
    let origin = OriginRepo::new();
    let fixture = TestFixture::new()
        .with_manifest(&component_manifest(&[("core", origin.url("version=v1.0.0"))]));

    fixture
        .command()
        .args(["sync", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v1.0.0"));

    let clone = fixture.path().join("core");
    assert_eq!(std::fs::read_to_string(clone.join("README.md")).unwrap(), "first");
    assert_eq!(
        git_output(&clone, &["describe", "--tags", "--exact-match"]),
        "v1.0.0"
    );
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_parallel_with_failure() {
    let first = OriginRepo::new();
    let second = OriginRepo::new();
    let fixture = TestFixture::new().with_manifest(&component_manifest(&[
        ("one", first.url("")),
        ("two", second.url("")),
        ("broken", "file:///nonexistent/monhang-origin.git".to_string()),
    ]));

    fixture
        .command()
        .args(["sync", "--no-progress", "--parallel", "--jobs", "2"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("2 cloned, 0 updated, 1 failed"))
        .stderr(predicate::str::contains("1 of 3 components failed to sync"));

    assert!(fixture.path().join("one/.git").exists());
    assert!(fixture.path().join("two/.git").exists());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_ws_sync_alias() {
    let origin = OriginRepo::new();
    let fixture = TestFixture::new()
        .with_manifest(&component_manifest(&[("core", origin.url(""))]));

    fixture
        .command()
        .args(["ws-sync", "--no-progress"])
        .assert()
        .success();
    assert!(fixture.path().join("core/.git").exists());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_sync_into_explicit_root() {
    let origin = OriginRepo::new();
    let fixture = TestFixture::new()
        .with_manifest(&component_manifest(&[("core", origin.url(""))]));
    let root = assert_fs::TempDir::new().unwrap();

    fixture
        .command()
        .args(["sync", "--no-progress", "--root"])
        .arg(root.path())
        .assert()
        .success();
    assert!(root.path().join("core/.git").exists());
    assert!(!fixture.path().join("core").exists());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_git_status_after_sync() {
    let origin = OriginRepo::new();
    let fixture = TestFixture::new()
        .with_manifest(&component_manifest(&[("core", origin.url(""))]));

    fixture
        .command()
        .args(["sync", "--no-progress"])
        .assert()
        .success();

    fixture
        .command()
        .args(["git", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("main"))
        .stdout(predicate::str::contains("clean"));

    fixture
        .child("core/scratch.txt")
        .write_str("dirty")
        .unwrap();

    fixture
        .command()
        .args(["git", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 change"));
}
