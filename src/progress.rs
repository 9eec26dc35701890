//! # Progress Polling
//!
//! Presentation code never receives events from workers. It polls the
//! [`SyncResults`] store on a fixed interval and redraws from each snapshot.
//! [`poll_until`] is the loop; [`SyncProgress`] is the indicatif spinner the
//! CLI draws with it.

use std::ops::ControlFlow;
use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::error::Result;
use crate::results::{SyncRecord, SyncResults, SyncState};

/// Calls `tick` every `interval` until it breaks, returning the break value.
/// The first tick happens immediately.
pub fn poll_until<T>(interval: Duration, mut tick: impl FnMut() -> ControlFlow<T>) -> T {
    loop {
        if let ControlFlow::Break(value) = tick() {
            return value;
        }
        thread::sleep(interval);
    }
}

/// Polls `results` until every expected record is terminal, or until
/// `stopped` reports that the writer has gone away.
///
/// `on_snapshot` sees every snapshot, including the final one. `expected` is
/// the number of records the run will create; polling does not stop before
/// that many exist unless `stopped` returns true.
pub fn watch_results(
    results: &SyncResults,
    expected: usize,
    interval: Duration,
    stopped: impl Fn() -> bool,
    mut on_snapshot: impl FnMut(&[SyncRecord]),
) -> Result<Vec<SyncRecord>> {
    poll_until(interval, || {
        // Checked before the snapshot so a stopped writer's last records are seen.
        let writer_gone = stopped();
        let snapshot = match results.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => return ControlFlow::Break(Err(e)),
        };
        on_snapshot(&snapshot);
        let finished = snapshot.iter().filter(|r| r.state.is_terminal()).count();
        if writer_gone || (snapshot.len() >= expected && finished == snapshot.len()) {
            ControlFlow::Break(Ok(snapshot))
        } else {
            ControlFlow::Continue(())
        }
    })
}

/// A one-line spinner summarising a sync in flight.
pub struct SyncProgress {
    bar: ProgressBar,
    total: usize,
}

impl SyncProgress {
    /// A spinner drawn to stderr.
    pub fn new(total: usize) -> Self {
        Self::with_target(total, ProgressDrawTarget::stderr())
    }

    /// A spinner that draws nothing, for non-interactive output.
    pub fn hidden(total: usize) -> Self {
        Self::with_target(total, ProgressDrawTarget::hidden())
    }

    fn with_target(total: usize, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}") {
            bar.set_style(style);
        }
        Self { bar, total }
    }

    /// Redraws from a snapshot.
    pub fn update(&self, snapshot: &[SyncRecord]) {
        let done = snapshot.iter().filter(|r| r.state.is_terminal()).count();
        self.bar.set_position(done as u64);
        self.bar.set_message(status_line(snapshot, self.total));
        self.bar.tick();
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// `syncing core, utils` while work is running, counts afterwards.
pub fn status_line(snapshot: &[SyncRecord], total: usize) -> String {
    let running: Vec<&str> = snapshot
        .iter()
        .filter(|r| r.state == SyncState::InProgress)
        .map(|r| r.name.as_str())
        .collect();
    if running.is_empty() {
        let failed = snapshot.iter().filter(|r| r.state == SyncState::Failed).count();
        format!("{} of {} done, {} failed", snapshot.len(), total, failed)
    } else {
        format!("syncing {}", running.join(", "))
    }
}
