//! # Logging
//!
//! The library logs through the `log` facade only. The binary installs
//! `env_logger` once via [`init`], writing to stderr by default.
//!
//! A live progress display owns the terminal while it runs, so log lines
//! written to stderr would tear it. [`redirect_to_file`] switches the
//! installed logger's output to a file for as long as the returned guard
//! lives; dropping the guard switches back to stderr.
//!
//! Each run carries a [`RunContext`] naming the run and the log target its
//! records are emitted under, instead of a globally mutable logger.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use log::LevelFilter;

use crate::error::{Error, Result};

type SharedFile = Arc<Mutex<Option<File>>>;

fn log_file_slot() -> &'static SharedFile {
    static SLOT: OnceLock<SharedFile> = OnceLock::new();
    SLOT.get_or_init(|| Arc::new(Mutex::new(None)))
}

/// Writer handed to `env_logger`: the redirect file when one is set,
/// stderr otherwise.
struct SwitchableWriter {
    slot: SharedFile,
}

impl Write for SwitchableWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.slot.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(file) => file.write(buf),
                None => io::stderr().write(buf),
            },
            Err(_) => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.slot.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(file) => file.flush(),
                None => io::stderr().flush(),
            },
            Err(_) => io::stderr().flush(),
        }
    }
}

/// Parses a `--log-level` value, case-insensitively. `warning` is accepted
/// as an alias for `warn`.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    if level.eq_ignore_ascii_case("warning") {
        return Some(LevelFilter::Warn);
    }
    level.parse::<LevelFilter>().ok()
}

/// Installs `env_logger` at `level`. `RUST_LOG`, when set, refines it.
///
/// Calling this more than once is harmless; only the first call installs.
pub fn init(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_env(env_logger::Env::default())
        .format_timestamp_millis()
        .target(env_logger::Target::Pipe(Box::new(SwitchableWriter {
            slot: Arc::clone(log_file_slot()),
        })));
    if builder.try_init().is_err() {
        log::debug!("logger already initialised");
    }
}

/// Restores stderr logging when dropped.
#[must_use = "logging returns to stderr as soon as the guard is dropped"]
pub struct RedirectGuard {
    path: PathBuf,
}

impl RedirectGuard {
    /// The file receiving log output.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        if let Ok(mut slot) = log_file_slot().lock() {
            if let Some(file) = slot.as_mut() {
                let _ = file.flush();
            }
            *slot = None;
        }
    }
}

/// Sends all log output to `path` (appending) until the guard is dropped.
pub fn redirect_to_file(path: &Path) -> Result<RedirectGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut slot = log_file_slot().lock().map_err(|_| Error::LockPoisoned {
        context: "log redirect".to_string(),
    })?;
    *slot = Some(file);
    Ok(RedirectGuard {
        path: path.to_path_buf(),
    })
}

/// Identity of one run: a unique id and the log target its records use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    run_id: String,
    target: String,
}

impl RunContext {
    /// A context for a run of `kind` (`sync`, `boot`, `exec`, `git`).
    pub fn new(kind: &str) -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            run_id: format!("{}-{}-{}", kind, secs, std::process::id()),
            target: format!("monhang::{}", kind),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Target passed to `log` macros for this run's records.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// `<log_dir>/<run id>.log`
    pub fn log_file(&self, log_dir: &Path) -> PathBuf {
        log_dir.join(format!("{}.log", self.run_id))
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new("run")
    }
}
