//! # VCS Operations
//!
//! The sync engine and the bulk git operations never spawn `git` directly.
//! They go through [`VcsOperations`], a narrow trait covering exactly the
//! commands monhang issues. [`GitCli`] is the production implementation and
//! delegates to the subprocess wrappers in [`crate::git`].
//!
//! Swapping the implementation is how the engine is tested: the unit tests
//! use in-memory fakes that record every call and fail on demand, so the
//! clone-or-update state machine can be exercised without a `git` binary.

use std::path::Path;

use crate::error::Result;
use crate::git;

/// Trait for version-control operations - allows mocking in tests
pub trait VcsOperations: Send + Sync {
    /// Clones `url` into `parent_dir/name`.
    fn clone_repo(&self, parent_dir: &Path, url: &str, name: &str) -> Result<()>;

    /// Fetches all remotes, including tags.
    fn fetch(&self, dir: &Path) -> Result<String>;

    /// Checks out a tag, branch or commit.
    fn checkout(&self, dir: &Path, reference: &str) -> Result<String>;

    /// Creates and checks out a new branch.
    fn create_branch(&self, dir: &Path, name: &str) -> Result<String>;

    /// Pulls the current branch.
    fn pull(&self, dir: &Path) -> Result<String>;

    fn current_branch(&self, dir: &Path) -> Result<String>;

    fn short_hash(&self, dir: &Path) -> Result<String>;

    /// The tag pointing exactly at `HEAD`; an error when there is none.
    fn exact_tag(&self, dir: &Path) -> Result<String>;

    /// Short-format working tree status, one line per changed path.
    fn status(&self, dir: &Path) -> Result<String>;

    /// Whether `dir` already holds a working tree. This is the sole
    /// clone-versus-update signal.
    fn is_repository(&self, dir: &Path) -> bool {
        git::is_repository(dir)
    }
}

/// The default implementation of `VcsOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl VcsOperations for GitCli {
    fn clone_repo(&self, parent_dir: &Path, url: &str, name: &str) -> Result<()> {
        git::clone(parent_dir, url, name)
    }

    fn fetch(&self, dir: &Path) -> Result<String> {
        git::fetch_all(dir)
    }

    fn checkout(&self, dir: &Path, reference: &str) -> Result<String> {
        git::checkout(dir, reference)
    }

    fn create_branch(&self, dir: &Path, name: &str) -> Result<String> {
        git::create_branch(dir, name)
    }

    fn pull(&self, dir: &Path) -> Result<String> {
        git::pull(dir)
    }

    fn current_branch(&self, dir: &Path) -> Result<String> {
        git::current_branch(dir)
    }

    fn short_hash(&self, dir: &Path) -> Result<String> {
        git::short_hash(dir)
    }

    fn exact_tag(&self, dir: &Path) -> Result<String> {
        git::exact_tag(dir)
    }

    fn status(&self, dir: &Path) -> Result<String> {
        git::status_short(dir)
    }
}

/// The version a working tree is at: an exact tag, else the branch name,
/// else the short commit hash. Empty when none of these can be read.
pub fn current_version(ops: &dyn VcsOperations, dir: &Path) -> String {
    if let Ok(tag) = ops.exact_tag(dir) {
        if !tag.is_empty() {
            return tag;
        }
    }
    if let Ok(branch) = ops.current_branch(dir) {
        if !branch.is_empty() && branch != "HEAD" {
            return branch;
        }
    }
    ops.short_hash(dir).unwrap_or_default()
}
