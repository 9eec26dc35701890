//! Default values for monhang configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// Manifest file looked up when `--config` is not given.
pub const DEFAULT_MANIFEST_FILENAME: &str = "monhang.json";

/// Name used for a component whose name can be neither read nor derived.
pub const DEFAULT_COMPONENT_NAME: &str = "component";

/// VCS type assumed when a source descriptor does not name one.
pub const DEFAULT_VCS_TYPE: &str = "git";

/// Interval at which progress displays poll result snapshots.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long `exec` keeps reading a command's output after the command exits.
/// Background processes that inherited the pipes are not waited for.
pub const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Returns the directory that receives log files while a live progress
/// display owns the terminal.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/monhang/logs` (XDG Base Directory)
/// - macOS: `~/Library/Caches/monhang/logs`
/// - Windows: `{FOLDERID_LocalAppData}\monhang\logs`
///
/// Falls back to `.monhang-logs` in the current directory if the platform
/// cache directory cannot be determined.
pub fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("monhang").join("logs"))
        .unwrap_or_else(|| PathBuf::from(".monhang-logs"))
}
