//! # Command Executor
//!
//! Runs one arbitrary command in every component directory and keeps a
//! [`CommandResult`] per component in a shared store, so a display can poll
//! progress while commands are still running.
//!
//! Commands are split on whitespace and spawned directly, without a shell:
//! pipes, globs and quoting are not interpreted. Standard output and standard
//! error are captured into one buffer in the order lines arrive. In live mode
//! each line is also passed to a [`LineSink`] as soon as it is read.
//! Output is read for at most [`OUTPUT_DRAIN_TIMEOUT`] after the command
//! exits, so background processes it leaves behind do not hold up the run.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::defaults::OUTPUT_DRAIN_TIMEOUT;
use crate::error::{Error, Result};
use crate::progress::poll_until;
use crate::sync::Concurrency;
use crate::tree::WorkItem;

/// Receives `(component, line)` for every output line in live mode.
pub type LineSink = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Exit code recorded when no process exit status is available.
pub const NO_EXIT_CODE: i32 = -1;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Outcome of running the command in one component.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub name: String,
    pub path: PathBuf,
    pub command: String,
    /// Combined stdout and stderr.
    pub output: String,
    pub exit_code: i32,
    pub error: Option<String>,
    pub started_at: Instant,
    pub finished_at: Option<Instant>,
    pub running: bool,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        !self.running && self.error.is_none() && self.exit_code == 0
    }

    /// Wall-clock time, or `None` while still running.
    pub fn duration(&self) -> Option<Duration> {
        self.finished_at.map(|end| end.duration_since(self.started_at))
    }
}

/// Success and failure counts over all results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub running: usize,
}

impl ExecSummary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Executes commands in component directories and stores their results.
#[derive(Clone, Default)]
pub struct RepoExecutor {
    results: Arc<Mutex<Vec<CommandResult>>>,
    sink: Option<LineSink>,
}

impl RepoExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams every output line to `sink` while commands run.
    pub fn live(sink: LineSink) -> Self {
        Self {
            results: Arc::default(),
            sink: Some(sink),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<CommandResult>>> {
        self.results.lock().map_err(|_| Error::LockPoisoned {
            context: "exec results".to_string(),
        })
    }

    /// Runs `command` inside `path` and records the result under `name`.
    ///
    /// Spawn failures and empty commands are recorded as failed results, not
    /// returned as errors.
    pub fn execute(&self, name: &str, path: &Path, command: &str) -> Result<CommandResult> {
        let started_at = Instant::now();
        let index = {
            let mut results = self.lock()?;
            results.push(CommandResult {
                name: name.to_string(),
                path: path.to_path_buf(),
                command: command.to_string(),
                output: String::new(),
                exit_code: 0,
                error: None,
                started_at,
                finished_at: None,
                running: true,
            });
            results.len() - 1
        };
        log::debug!("{}: running '{}' in {}", name, command, path.display());

        let (output, exit_code, error) = match self.run_process(name, path, command) {
            Ok(finished) => finished,
            Err(e) => {
                log::error!("{}: {}", name, e);
                (String::new(), NO_EXIT_CODE, Some(e.to_string()))
            }
        };

        let mut results = self.lock()?;
        let result = &mut results[index];
        result.output = output;
        result.exit_code = exit_code;
        result.error = error;
        result.running = false;
        result.finished_at = Some(Instant::now());

        match &result.error {
            Some(e) => log::warn!(
                "{}: failed after {:?} with exit code {}: {}",
                name,
                result.duration().unwrap_or_default(),
                result.exit_code,
                e
            ),
            None => log::debug!(
                "{}: completed in {:?}",
                name,
                result.duration().unwrap_or_default()
            ),
        }
        Ok(result.clone())
    }

    fn run_process(
        &self,
        name: &str,
        path: &Path,
        command: &str,
    ) -> Result<(String, i32, Option<String>)> {
        let mut words = command.split_whitespace();
        let program = words.next().ok_or_else(|| Error::EmptyCommand {
            component: name.to_string(),
        })?;

        let mut child = Command::new(program)
            .args(words)
            .current_dir(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::CommandSpawn {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        let output = Arc::new(Mutex::new(String::new()));
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(self.spawn_pump(name, stdout, &output));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(self.spawn_pump(name, stderr, &output));
        }

        let status = child.wait();

        // A background process may still hold the pipes open; stop reading
        // once the drain window closes and leave its pump detached.
        let deadline = Instant::now() + OUTPUT_DRAIN_TIMEOUT;
        poll_until(DRAIN_POLL_INTERVAL, || {
            if pumps.iter().all(|pump| pump.is_finished()) || Instant::now() >= deadline {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        for pump in pumps {
            if pump.is_finished() {
                let _ = pump.join();
            } else {
                log::warn!("{}: output still open after exit, ignoring the rest", name);
            }
        }

        let output = match output.lock() {
            Ok(output) => output.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let status = match status {
            Ok(status) => status,
            Err(e) => {
                return Ok((
                    output,
                    NO_EXIT_CODE,
                    Some(format!("failed to wait for '{}': {}", command, e)),
                ))
            }
        };

        let exit_code = status.code().unwrap_or(NO_EXIT_CODE);
        let error = if status.success() {
            None
        } else if status.code().is_some() {
            Some(format!("exit status {}", exit_code))
        } else {
            Some("terminated by signal".to_string())
        };
        Ok((output, exit_code, error))
    }

    /// Starts a thread copying lines from `pipe` into `output` and the live sink.
    fn spawn_pump(
        &self,
        name: &str,
        pipe: impl Read + Send + 'static,
        output: &Arc<Mutex<String>>,
    ) -> JoinHandle<()> {
        let name = name.to_string();
        let sink = self.sink.clone();
        let output = Arc::clone(output);
        thread::spawn(move || pump(&name, pipe, sink.as_ref(), &output))
    }

    /// Runs `command` in `root/<name>` for every item with a source.
    pub fn run_all(
        &self,
        root: &Path,
        items: &[WorkItem],
        command: &str,
        concurrency: Concurrency,
    ) -> Result<Vec<CommandResult>> {
        let items: Vec<&WorkItem> = items.iter().filter(|item| item.source.is_some()).collect();
        let run = |item: &&WorkItem| self.execute(&item.name, &root.join(&item.name), command);

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

    /// An independent copy of every result, in start order.
    pub fn results(&self) -> Result<Vec<CommandResult>> {
        Ok(self.lock()?.clone())
    }

    pub fn summary(&self) -> Result<ExecSummary> {
        let results = self.lock()?;
        let mut summary = ExecSummary::default();
        for result in results.iter() {
            if result.running {
                summary.running += 1;
            } else if result.success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }
        Ok(summary)
    }
}

/// Copies lines from a pipe into the shared buffer and the live sink.
fn pump(name: &str, pipe: impl Read, sink: Option<&LineSink>, output: &Mutex<String>) {
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf);
                if let Some(sink) = sink {
                    sink(name, text.trim_end_matches(['\n', '\r']));
                }
                if let Ok(mut output) = output.lock() {
                    output.push_str(&text);
                }
            }
            Err(e) => {
                log::debug!("{}: stopped reading output: {}", name, e);
                break;
            }
        }
    }
}
