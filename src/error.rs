//! # Error Handling
//!
//! This module defines the centralized error type for `monhang`. It uses the
//! `thiserror` library to create a single `Error` enum that covers every
//! anticipated failure mode, providing clear and descriptive messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum representing all possible errors that can
//!   occur within the library. Each variant carries the context needed to
//!   explain the failure to a user.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! The variants fall into four groups:
//!
//! - Configuration errors (manifest decoding, validation, dependency cycles).
//!   These are fatal and are raised before any subprocess work begins.
//! - Operation errors (a `git` invocation or an `exec` command failing). These
//!   are recorded per component and never abort sibling components.
//! - Empty-input errors (an empty `exec` command), recorded without spawning.
//! - Infrastructure errors wrapped from `std::io`, `serde_json`, `toml`,
//!   `regex` and `rayon`, plus lock poisoning.
//!
//! Source descriptor resolution never produces an error; malformed sources
//! degrade to a best-effort URL instead.

use thiserror::Error;

/// Main error type for monhang operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest could not be decoded.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// The manifest decoded but a field failed structural validation.
    #[error("Manifest validation error in '{field}': {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestValidation {
        field: String,
        message: String,
        hint: Option<String>,
    },

    /// A circular dependency was detected in the dependency graph.
    #[error("Cycle detected in component dependencies: {cycle}")]
    CycleDetected { cycle: String },

    /// A dependency edge referenced a node that is not part of the graph.
    #[error("Unknown dependency node: {name}")]
    UnknownDependency { name: String },

    /// An error occurred while cloning a repository.
    ///
    /// Includes the repository URL, the requested ref and an optional hint.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        hint: Option<String>,
    },

    /// A git subprocess exited unsuccessfully or could not be spawned.
    #[error("Git command failed in {dir}: git {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// An `exec` command could not be started.
    #[error("Failed to start '{command}': {message}")]
    CommandSpawn { command: String, message: String },

    /// An `exec` command string was empty.
    #[error("Empty command for component '{component}'")]
    EmptyCommand { component: String },

    /// A component directory expected to hold a working tree does not.
    #[error("Not a git repository: {path}")]
    NotARepository { path: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON decoding error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A TOML decoding error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// The worker pool for a parallel run could not be built.
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// An error indicating that a mutex or other lock has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns true for errors that stop a run before any subprocess starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConfigParse { .. }
                | Error::ManifestValidation { .. }
                | Error::CycleDetected { .. }
                | Error::UnknownDependency { .. }
                | Error::Json(_)
                | Error::Toml(_)
        )
    }
}
