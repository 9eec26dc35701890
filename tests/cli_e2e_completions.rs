//! End-to-end tests for the `monhang completions` command.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

#[test]
fn test_completions_help() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("completions")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generate shell completion scripts",
        ))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("zsh"))
        .stdout(predicate::str::contains("fish"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_monhang()"))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_completions_zsh() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("completions")
        .arg("zsh")
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef monhang"))
        .stdout(predicate::str::contains("boot"))
        .stdout(predicate::str::contains("tree"));
}

#[test]
fn test_completions_fish() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("completions")
        .arg("fish")
        .assert()
        .success()
        .stdout(predicate::str::contains("__fish_monhang"))
        .stdout(predicate::str::contains("git"));
}

#[test]
fn test_completions_powershell() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("completions")
        .arg("powershell")
        .assert()
        .success()
        .stdout(predicate::str::contains("Register-ArgumentCompleter"))
        .stdout(predicate::str::contains("monhang"));
}

#[test]
fn test_completions_invalid_shell() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("completions")
        .arg("invalid-shell")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_completions_missing_shell_argument() {
    let mut cmd = cargo_bin_cmd!("monhang");
    cmd.arg("completions")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
