//! # Sync Engine
//!
//! Brings every component of a workspace to its declared state. For each
//! [`WorkItem`] the engine runs a small state machine:
//!
//! 1.  **Pending → InProgress**: an in-progress record is created in the
//!     [`SyncResults`] store and its [`RecordId`](crate::results::RecordId)
//!     kept by the worker.
//! 2.  **Clone or update**: `<root>/<name>/.git` being a directory selects the
//!     update path, anything else the clone path.
//!     - Clone: `git clone <url> <name>`, then `git checkout <version>` when a
//!       version was requested.
//!     - Update with a version: `git fetch --all --tags`, then
//!       `git checkout <version>`. Without a version: `git pull`.
//! 3.  **Terminal**: the record becomes `Cloned` or `Updated` with the version
//!     the working tree ended at, or `Failed` with the error. Nothing is
//!     retried and no state is revisited.
//!
//! Components run one at a time ([`Concurrency::Sequential`]) or on a rayon
//! pool ([`Concurrency::Parallel`]) with one worker per component unless
//! capped. A failing component never stops its siblings. Graph-mode runs
//! ([`SyncEngine::run_graph`]) are always sequential, in dependency order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::logging::RunContext;
use crate::results::{SyncOutcome, SyncResults, SyncSummary};
use crate::source::ResolvedSource;
use crate::tree::WorkItem;
use crate::vcs::{current_version, GitCli, VcsOperations};

/// How many components are synced at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    #[default]
    Sequential,
    /// One worker per component, or at most `max_workers` when set.
    Parallel { max_workers: Option<usize> },
}

impl Concurrency {
    /// Maps the CLI's `--parallel` / `--jobs` flags.
    pub fn from_flags(parallel: bool, jobs: Option<usize>) -> Self {
        if parallel {
            Concurrency::Parallel {
                max_workers: jobs.filter(|&n| n > 0),
            }
        } else {
            Concurrency::Sequential
        }
    }

    /// Worker count for `items` components.
    pub fn workers(self, items: usize) -> usize {
        match self {
            Concurrency::Sequential => 1,
            Concurrency::Parallel { max_workers } => {
                let wanted = items.max(1);
                max_workers.map_or(wanted, |cap| wanted.min(cap.max(1)))
            }
        }
    }
}

/// Drives clone-or-update for a set of components under one root directory.
#[derive(Clone)]
pub struct SyncEngine {
    root: PathBuf,
    vcs: Arc<dyn VcsOperations>,
    results: SyncResults,
    concurrency: Concurrency,
    context: RunContext,
}

impl SyncEngine {
    /// An engine that uses the system `git` binary.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_operations(root, Arc::new(GitCli))
    }

    /// An engine with custom VCS operations, mostly for testing.
    pub fn with_operations(root: impl Into<PathBuf>, vcs: Arc<dyn VcsOperations>) -> Self {
        Self {
            root: root.into(),
            vcs,
            results: SyncResults::new(),
            concurrency: Concurrency::Sequential,
            context: RunContext::new("sync"),
        }
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn context(mut self, context: RunContext) -> Self {
        self.context = context;
        self
    }

    /// Shares an existing store instead of the engine's own.
    pub fn results_store(mut self, results: SyncResults) -> Self {
        self.results = results;
        self
    }

    /// A handle to the store this engine records into.
    pub fn results(&self) -> SyncResults {
        self.results.clone()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Items that will produce a record when passed to [`SyncEngine::run`].
    pub fn syncable(items: &[WorkItem]) -> usize {
        items.iter().filter(|item| item.source.is_some()).count()
    }

    /// Syncs every item that has a source and returns the counts of this run.
    pub fn run(&self, items: &[WorkItem]) -> Result<SyncSummary> {
        let items: Vec<&WorkItem> = items
            .iter()
            .filter(|item| {
                if item.source.is_none() {
                    log::debug!(target: self.context.target(), "{}: no source, skipping", item.name);
                }
                item.source.is_some()
            })
            .collect();
        fs::create_dir_all(&self.root)?;

        let workers = self.concurrency.workers(items.len());
        log::info!(
            target: self.context.target(),
            "run {}: syncing {} components with {} worker(s) under {}",
            self.context.run_id(),
            items.len(),
            workers,
            self.root.display()
        );

        let outcomes = match self.concurrency {
            Concurrency::Sequential => items
                .iter()
                .map(|item| self.sync_component(item))
                .collect::<Result<Vec<_>>>()?,
            Concurrency::Parallel { .. } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()?;
                pool.install(|| {
                    items
                        .par_iter()
                        .map(|item| self.sync_component(item))
                        .collect::<Result<Vec<_>>>()
                })?
            }
        };

        Ok(summarize(&outcomes))
    }

    /// Runs [`SyncEngine::run`] on a background thread. The returned handle
    /// exposes the store for polling while the run is in flight.
    pub fn spawn(self, items: Vec<WorkItem>) -> SyncHandle {
        let results = self.results();
        let handle = thread::spawn(move || self.run(&items));
        SyncHandle { results, handle }
    }

    /// Syncs the nodes of a dependency graph one by one, dependencies first.
    pub fn run_graph(&self, graph: &DependencyGraph) -> Result<SyncSummary> {
        let order = graph.topological_order()?;
        fs::create_dir_all(&self.root)?;
        log::info!(
            target: self.context.target(),
            "run {}: booting {} components in dependency order",
            self.context.run_id(),
            order.len()
        );

        let mut outcomes = Vec::with_capacity(order.len());
        for node in order {
            outcomes.push(self.sync_component(&node.work_item())?);
        }
        Ok(summarize(&outcomes))
    }

    /// Syncs one component, recording its lifecycle in the store.
    ///
    /// Operation failures are recorded and returned as
    /// [`SyncOutcome::Failed`]; only store errors are returned as `Err`.
    pub fn sync_component(&self, item: &WorkItem) -> Result<SyncOutcome> {
        let target = self.context.target();
        let id = self.results.record_in_progress(&item.name)?;
        log::info!(target: target, "{}: sync started", item.name);

        let outcome = match &item.source {
            Some(source) => match self.clone_or_update(&item.name, source) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::warn!(target: target, "{}: sync failed: {}", item.name, e);
                    SyncOutcome::failed(&e)
                }
            },
            None => {
                log::warn!(target: target, "{}: no source configured", item.name);
                SyncOutcome::Failed {
                    error: format!("component '{}' has no source", item.name),
                }
            }
        };

        match &outcome {
            SyncOutcome::Cloned { version } => {
                log::info!(target: target, "{}: cloned at {}", item.name, version)
            }
            SyncOutcome::Updated { version } => {
                log::info!(target: target, "{}: updated to {}", item.name, version)
            }
            SyncOutcome::Failed { .. } => {}
        }

        self.results.finish(id, outcome.clone())?;
        Ok(outcome)
    }

    fn clone_or_update(&self, name: &str, source: &ResolvedSource) -> Result<SyncOutcome> {
        let dir = self.root.join(name);
        let ops = self.vcs.as_ref();

        if ops.is_repository(&dir) {
            if source.has_version() {
                ops.fetch(&dir)?;
                ops.checkout(&dir, &source.version)?;
            } else {
                ops.pull(&dir)?;
            }
            Ok(SyncOutcome::Updated {
                version: current_version(ops, &dir),
            })
        } else {
            ops.clone_repo(&self.root, &source.url, name)?;
            if source.has_version() {
                ops.checkout(&dir, &source.version)?;
            }
            Ok(SyncOutcome::Cloned {
                version: current_version(ops, &dir),
            })
        }
    }
}

/// A sync running on a background thread.
pub struct SyncHandle {
    results: SyncResults,
    handle: JoinHandle<Result<SyncSummary>>,
}

impl SyncHandle {
    /// The store the background run records into.
    pub fn results(&self) -> &SyncResults {
        &self.results
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the run to end.
    pub fn join(self) -> Result<SyncSummary> {
        self.handle.join().map_err(|_| {
            Error::Io(std::io::Error::other("sync thread panicked"))
        })?
    }
}

fn summarize(outcomes: &[SyncOutcome]) -> SyncSummary {
    let mut summary = SyncSummary::default();
    for outcome in outcomes {
        match outcome {
            SyncOutcome::Cloned { .. } => summary.cloned += 1,
            SyncOutcome::Updated { .. } => summary.updated += 1,
            SyncOutcome::Failed { .. } => summary.failed += 1,
        }
    }
    summary
}
