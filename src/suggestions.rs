//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Following CLI recommendations,
//! errors should tell users what went wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use monhang::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Manifest not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::manifest_not_found(path));
//! ```

use std::path::Path;

use crate::error::Error;

/// Generate an error for when the manifest file is not found.
///
/// Includes hints about:
/// - Creating a new manifest
/// - Using the -c/--config flag
/// - Using the MONHANG_CONFIG environment variable
pub fn manifest_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Manifest not found: {path}\n\n\
         hint: Create a monhang.json listing your components\n\
         hint: Use -c/--config to specify a different path\n\
         hint: Set MONHANG_CONFIG environment variable",
        path = path.display()
    )
}

/// Generate an error for a manifest that could not be loaded.
///
/// Library errors already carry their own hint; this adds the file name.
pub fn manifest_invalid(path: &Path, error: &Error) -> anyhow::Error {
    anyhow::anyhow!(
        "Failed to load manifest {path}: {error}",
        path = path.display()
    )
}

/// Generate an error for a cycle detected in component dependencies.
///
/// Includes hints about how to resolve the cycle.
pub fn cycle_detected(cycle: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Cycle detected in component dependencies: {cycle}\n\n\
         hint: Remove one of the 'deps' entries to break the cycle\n\
         hint: Move the shared code into a component both sides depend on"
    )
}

/// Generate an error for `exec` without a command.
pub fn empty_command() -> anyhow::Error {
    anyhow::anyhow!(
        "No command given\n\n\
         hint: Pass the command after '--', e.g. monhang exec -- git log -1\n\
         hint: Commands run without a shell; wrap pipes in 'sh -c \"...\"'"
    )
}

/// Generate the error a run returns when some components failed.
///
/// Every component's status has already been printed; this only sets the
/// exit code and points at the logs.
pub fn components_failed(failed: usize, total: usize, what: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "{failed} of {total} components failed to {what}\n\n\
         hint: Rerun with --log-level debug to see every git invocation"
    )
}

/// Maps configuration errors raised by the library onto hinted CLI errors.
pub fn from_library(error: Error) -> anyhow::Error {
    match error {
        Error::CycleDetected { cycle } => cycle_detected(&cycle),
        other => anyhow::Error::new(other),
    }
}
