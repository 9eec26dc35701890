//! # Bulk Git Operations
//!
//! Applies one [`GitOperation`] to every component working tree and records a
//! [`GitOpResult`] per component in a [`GitExecutor`] store. All git access
//! goes through [`VcsOperations`], the same seam the sync engine uses.
//!
//! Each result carries a one-line `status` summary for tables:
//!
//! | Operation  | Summary                              |
//! |------------|--------------------------------------|
//! | `status`   | `clean` or `N changes`               |
//! | `pull`     | `updated: <old> -> <new>` or `up to date` |
//! | `fetch`    | `fetched`                            |
//! | `checkout` | `on <branch>`                        |
//! | `branch`   | `created <branch>`                   |

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::sync::Concurrency;
use crate::tree::WorkItem;
use crate::vcs::{GitCli, VcsOperations};

/// A git operation applied to every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOperation {
    Status,
    Pull,
    Fetch,
    /// Switch to an existing branch.
    Checkout(String),
    /// Create and switch to a new branch.
    Branch(String),
}

impl GitOperation {
    pub fn label(&self) -> &'static str {
        match self {
            GitOperation::Status => "status",
            GitOperation::Pull => "pull",
            GitOperation::Fetch => "fetch",
            GitOperation::Checkout(_) => "checkout",
            GitOperation::Branch(_) => "branch",
        }
    }
}

impl fmt::Display for GitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitOperation::Checkout(branch) | GitOperation::Branch(branch) => {
                write!(f, "{} {}", self.label(), branch)
            }
            _ => f.write_str(self.label()),
        }
    }
}

/// Outcome of one operation in one component.
#[derive(Debug, Clone)]
pub struct GitOpResult {
    pub name: String,
    pub path: PathBuf,
    pub operation: String,
    pub branch: String,
    /// Short commit hash after the operation.
    pub commit: String,
    pub status: String,
    pub output: String,
    pub error: Option<String>,
    pub started_at: Instant,
    pub finished_at: Option<Instant>,
    pub running: bool,
}

impl GitOpResult {
    pub fn success(&self) -> bool {
        !self.running && self.error.is_none()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.finished_at.map(|end| end.duration_since(self.started_at))
    }
}

/// What an operation produced before it is written to the store.
#[derive(Default)]
struct Completed {
    branch: String,
    commit: String,
    status: String,
    output: String,
}

/// Runs [`GitOperation`]s across components and stores their results.
#[derive(Clone)]
pub struct GitExecutor {
    vcs: Arc<dyn VcsOperations>,
    results: Arc<Mutex<Vec<GitOpResult>>>,
}

impl Default for GitExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl GitExecutor {
    pub fn new() -> Self {
        Self::with_operations(Arc::new(GitCli))
    }

    pub fn with_operations(vcs: Arc<dyn VcsOperations>) -> Self {
        Self {
            vcs,
            results: Arc::default(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<GitOpResult>>> {
        self.results.lock().map_err(|_| Error::LockPoisoned {
            context: "git results".to_string(),
        })
    }

    /// Applies `operation` to the working tree at `path`.
    pub fn execute(&self, name: &str, path: &Path, operation: &GitOperation) -> Result<GitOpResult> {
        let index = {
            let mut results = self.lock()?;
            results.push(GitOpResult {
                name: name.to_string(),
                path: path.to_path_buf(),
                operation: operation.to_string(),
                branch: String::new(),
                commit: String::new(),
                status: String::new(),
                output: String::new(),
                error: None,
                started_at: Instant::now(),
                finished_at: None,
                running: true,
            });
            results.len() - 1
        };
        log::debug!("{}: git {}", name, operation);

        let (completed, error) = match self.apply(path, operation) {
            Ok(completed) => (completed, None),
            Err(e) => {
                log::warn!("{}: git {} failed: {}", name, operation, e);
                let completed = if self.vcs.is_repository(path) {
                    Completed {
                        branch: self.vcs.current_branch(path).unwrap_or_default(),
                        commit: self.vcs.short_hash(path).unwrap_or_default(),
                        ..Default::default()
                    }
                } else {
                    Completed::default()
                };
                (completed, Some(e.to_string()))
            }
        };

        let mut results = self.lock()?;
        let result = &mut results[index];
        result.branch = completed.branch;
        result.commit = completed.commit;
        result.status = completed.status;
        result.output = completed.output;
        result.error = error;
        result.running = false;
        result.finished_at = Some(Instant::now());
        Ok(result.clone())
    }

    fn apply(&self, path: &Path, operation: &GitOperation) -> Result<Completed> {
        let ops = self.vcs.as_ref();
        if !ops.is_repository(path) {
            return Err(Error::NotARepository {
                path: path.display().to_string(),
            });
        }

        let mut completed = match operation {
            GitOperation::Status => {
                let output = ops.status(path)?;
                Completed {
                    status: change_summary(&output),
                    output,
                    ..Default::default()
                }
            }
            GitOperation::Pull => {
                let before = ops.short_hash(path).unwrap_or_default();
                let output = ops.pull(path)?;
                let after = ops.short_hash(path).unwrap_or_default();
                let status = if before != after {
                    format!("updated: {} -> {}", before, after)
                } else {
                    "up to date".to_string()
                };
                Completed {
                    commit: after,
                    status,
                    output,
                    ..Default::default()
                }
            }
            GitOperation::Fetch => Completed {
                output: ops.fetch(path)?,
                status: "fetched".to_string(),
                ..Default::default()
            },
            GitOperation::Checkout(branch) => Completed {
                output: ops.checkout(path, branch)?,
                status: format!("on {}", branch),
                ..Default::default()
            },
            GitOperation::Branch(branch) => Completed {
                output: ops.create_branch(path, branch)?,
                status: format!("created {}", branch),
                ..Default::default()
            },
        };

        completed.branch = ops.current_branch(path).unwrap_or_default();
        if completed.commit.is_empty() {
            completed.commit = ops.short_hash(path).unwrap_or_default();
        }
        Ok(completed)
    }

    /// Applies `operation` to `root/<name>` for every item with a source.
    pub fn run_all(
        &self,
        root: &Path,
        items: &[WorkItem],
        operation: &GitOperation,
        concurrency: Concurrency,
    ) -> Result<Vec<GitOpResult>> {
        let items: Vec<&WorkItem> = items.iter().filter(|item| item.source.is_some()).collect();
        let run = |item: &&WorkItem| self.execute(&item.name, &root.join(&item.name), operation);

        match concurrency {
            Concurrency::Sequential => items.iter().map(run).collect(),
            Concurrency::Parallel { .. } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(concurrency.workers(items.len()))
                    .build()?;
                pool.install(|| items.par_iter().map(run).collect())
            }
        }
    }

    pub fn results(&self) -> Result<Vec<GitOpResult>> {
        Ok(self.lock()?.clone())
    }

    /// Number of finished results that failed.
    pub fn failures(&self) -> Result<usize> {
        Ok(self
            .lock()?
            .iter()
            .filter(|r| !r.running && r.error.is_some())
            .count())
    }
}

/// `clean`, or `N changes` counting lines of `git status --short`.
pub fn change_summary(status: &str) -> String {
    let changes = status.lines().filter(|line| !line.trim().is_empty()).count();
    match changes {
        0 => "clean".to_string(),
        1 => "1 change".to_string(),
        n => format!("{} changes", n),
    }
}
