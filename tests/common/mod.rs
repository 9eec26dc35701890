//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures, helper functions, and manifest
//! snippets to reduce duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest(manifests::GROUPED);
//!     fixture.command().arg("tree").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    #[allow(unused_imports)]
    pub use super::OriginRepo;
    pub use super::TestFixture;
}

/// Common manifest snippets for testing.
#[allow(dead_code)]
pub mod manifests {
    /// Two top-level components, one of them with a nested plugin.
    pub const GROUPED: &str = r#"{
    "name": "workspace",
    "components": [
        {
            "source": "git://github.com/org/core.git?version=v1.0.0",
            "description": "core library",
            "components": [
                {"name": "plugin", "source": "git@github.com:org/plugin.git"}
            ]
        },
        {"name": "docs", "source": "https://github.com/org/docs.git", "version": "2.1.0"}
    ]
}"#;

    /// A manifest with an unknown field.
    pub const UNKNOWN_FIELD: &str = r#"{"name": "workspace", "colour": "blue"}"#;

    /// A graph-mode project whose app depends on lib at build time.
    pub const PROJECT: &str = r#"{
    "name": "app",
    "version": "v1.0.0",
    "repo": "app.git",
    "repoconfig": {"base": "https://git.example.com/", "type": "git"},
    "deps": {
        "build": [{"name": "lib", "version": "v0.3.0", "repo": "lib.git"}],
        "runtime": [{"name": "runtime", "repo": "runtime.git"}]
    }
}"#;

    /// A graph-mode project with a cycle between app and lib.
    pub const CYCLIC_PROJECT: &str = r#"{
    "name": "app",
    "deps": {"build": [{"name": "lib", "deps": {"runtime": [{"name": "app"}]}}]}
}"#;
}

/// A test fixture that provides a temporary directory with optional manifest.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_manifest(manifests::GROUPED)
///     .with_file("core/README.md", "hello world");
///
/// fixture.command().arg("tree").assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `monhang.json` manifest with the given content.
    pub fn with_manifest(self, content: &str) -> Self {
        self.temp_dir
            .child("monhang.json")
            .write_str(content)
            .expect("Failed to write manifest");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.temp_dir.path().join("monhang.json")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory, with
    /// colours off and `MONHANG_CONFIG` cleared.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("monhang");
        cmd.current_dir(self.path())
            .env_remove("MONHANG_CONFIG")
            .arg("--color=never");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A local git repository usable as a clone source through a `file://` URL.
///
/// The repository has a `main` branch with two commits; the first one is
/// tagged `v1.0.0`.
#[allow(dead_code)]
pub struct OriginRepo {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl OriginRepo {
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let repo = Self { temp_dir };
        repo.git(&["init"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.commit("README.md", "first", "Initial commit");
        repo.git(&["tag", "v1.0.0"]);
        repo.commit("README.md", "second", "Second commit");
        repo
    }

    /// Writes `file` and commits it.
    pub fn commit(&self, file: &str, content: &str, message: &str) {
        self.temp_dir
            .child(file)
            .write_str(content)
            .expect("Failed to write file");
        self.git(&["add", "."]);
        self.git(&["commit", "-m", message]);
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// `file://` URL of the repository, optionally with a query string.
    pub fn url(&self, query: &str) -> String {
        let url = format!("file://{}", self.path().display());
        if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        }
    }

    fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            status.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&status.stderr)
        );
    }
}

/// Runs `git args` in `dir` and returns trimmed stdout.
#[allow(dead_code)]
pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_manifest() {
        let fixture = TestFixture::new().with_manifest(manifests::GROUPED);
        assert!(fixture.manifest_path().exists());
    }

    #[test]
    fn test_manifests_are_valid_json() {
        for manifest in [
            manifests::GROUPED,
            manifests::UNKNOWN_FIELD,
            manifests::PROJECT,
            manifests::CYCLIC_PROJECT,
        ] {
            serde_json::from_str::<serde_json::Value>(manifest)
                .expect("Manifest should be valid JSON");
        }
    }
}
