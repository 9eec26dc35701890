//! # Result Store
//!
//! Workers record the lifecycle of each component here while progress
//! displays poll it. Every operation takes the same mutex, so a reader never
//! observes a half-written record, and [`SyncResults::snapshot`] hands out an
//! independent copy that can be rendered without holding the lock.
//!
//! A record starts in progress and is mutated exactly once into a terminal
//! state ([`SyncState::Cloned`], [`SyncState::Updated`] or
//! [`SyncState::Failed`]). The engine addresses records by the [`RecordId`]
//! returned at creation; [`SyncResults::record_terminal`] addresses them by
//! name and updates the oldest in-progress record with that name.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};

/// Lifecycle state of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncState {
    Pending,
    InProgress,
    Cloned,
    Updated,
    Failed,
}

impl SyncState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SyncState::Cloned | SyncState::Updated | SyncState::Failed)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SyncState::Pending => "pending",
            SyncState::InProgress => "in progress",
            SyncState::Cloned => "cloned",
            SyncState::Updated => "updated",
            SyncState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// How a component's sync ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Cloned { version: String },
    Updated { version: String },
    Failed { error: String },
}

impl SyncOutcome {
    pub fn failed(error: &Error) -> Self {
        SyncOutcome::Failed {
            error: error.to_string(),
        }
    }

    fn state(&self) -> SyncState {
        match self {
            SyncOutcome::Cloned { .. } => SyncState::Cloned,
            SyncOutcome::Updated { .. } => SyncState::Updated,
            SyncOutcome::Failed { .. } => SyncState::Failed,
        }
    }
}

/// Handle to one record, returned by [`SyncResults::record_in_progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(usize);

/// The recorded state of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub name: String,
    pub state: SyncState,
    /// Version after a successful sync, empty otherwise.
    pub version: String,
    /// Present only when the state is [`SyncState::Failed`].
    pub error: Option<String>,
}

impl SyncRecord {
    pub fn is_in_progress(&self) -> bool {
        self.state == SyncState::InProgress
    }

    fn apply(&mut self, outcome: SyncOutcome) {
        self.state = outcome.state();
        match outcome {
            SyncOutcome::Cloned { version } | SyncOutcome::Updated { version } => {
                self.version = version;
                self.error = None;
            }
            SyncOutcome::Failed { error } => {
                self.version.clear();
                self.error = Some(error);
            }
        }
    }
}

/// Counts of records per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub cloned: usize,
    pub updated: usize,
    pub failed: usize,
    pub in_progress: usize,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.cloned + self.updated + self.failed + self.in_progress
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Thread-safe store of sync records. Cloning shares the underlying store.
#[derive(Debug, Clone, Default)]
pub struct SyncResults {
    records: Arc<Mutex<Vec<SyncRecord>>>,
}

impl SyncResults {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<SyncRecord>>> {
        self.records.lock().map_err(|_| Error::LockPoisoned {
            context: "sync results".to_string(),
        })
    }

    /// Appends an in-progress record for `name`.
    pub fn record_in_progress(&self, name: &str) -> Result<RecordId> {
        let mut records = self.lock()?;
        records.push(SyncRecord {
            name: name.to_string(),
            state: SyncState::InProgress,
            version: String::new(),
            error: None,
        });
        Ok(RecordId(records.len() - 1))
    }

    /// Moves the oldest in-progress record named `name` to its terminal
    /// state. Returns false when there is no such record.
    pub fn record_terminal(&self, name: &str, outcome: SyncOutcome) -> Result<bool> {
        let mut records = self.lock()?;
        match records
            .iter_mut()
            .find(|record| record.name == name && record.is_in_progress())
        {
            Some(record) => {
                record.apply(outcome);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Moves the record behind `id` to its terminal state. Records that are
    /// already terminal are left untouched and false is returned.
    pub fn finish(&self, id: RecordId, outcome: SyncOutcome) -> Result<bool> {
        let mut records = self.lock()?;
        match records.get_mut(id.0) {
            Some(record) if record.is_in_progress() => {
                record.apply(outcome);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// An independent copy of every record, in creation order.
    pub fn snapshot(&self) -> Result<Vec<SyncRecord>> {
        Ok(self.lock()?.clone())
    }

    pub fn summary(&self) -> Result<SyncSummary> {
        let records = self.lock()?;
        let mut summary = SyncSummary::default();
        for record in records.iter() {
            match record.state {
                SyncState::Cloned => summary.cloned += 1,
                SyncState::Updated => summary.updated += 1,
                SyncState::Failed => summary.failed += 1,
                SyncState::InProgress | SyncState::Pending => summary.in_progress += 1,
            }
        }
        Ok(summary)
    }

    /// True when no record is still in progress.
    pub fn all_done(&self) -> Result<bool> {
        Ok(self.lock()?.iter().all(|record| record.state.is_terminal()))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}
