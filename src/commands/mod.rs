//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `monhang`
//! command-line tool. Each subcommand is defined in its own file to keep the
//! logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! The `execute` function is the main entry point for the command and is
//! responsible for orchestrating the necessary operations, calling into the
//! `monhang` library to perform the core logic. Manifest loading shared by
//! several commands lives here.

pub mod boot;
pub mod completions;
pub mod exec;
pub mod git;
pub mod sync;
pub mod tree;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;

use monhang::error::Error;
use monhang::manifest;
use monhang::suggestions;
use monhang::tree::ComponentTree;

/// A loaded component manifest and the directory its components live in.
pub struct Workspace {
    pub root: PathBuf,
    pub tree: ComponentTree,
}

/// Loads the manifest at `config`. Components live next to the manifest
/// unless `root` overrides it.
pub fn load_workspace(config: &Path, root: Option<&Path>) -> Result<Workspace> {
    let descriptor = manifest::from_file(config).map_err(|e| manifest_error(config, e))?;
    Ok(Workspace {
        root: workspace_root(config, root),
        tree: ComponentTree::from_root(&descriptor),
    })
}

/// Turns a manifest loading failure into a hinted CLI error.
pub fn manifest_error(path: &Path, error: Error) -> anyhow::Error {
    match error {
        Error::Io(ref io) if io.kind() == ErrorKind::NotFound => {
            suggestions::manifest_not_found(path)
        }
        other => suggestions::manifest_invalid(path, &other),
    }
}

/// The directory component working trees are placed in.
pub fn workspace_root(config: &Path, root: Option<&Path>) -> PathBuf {
    match root {
        Some(root) => root.to_path_buf(),
        None => config
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Width of the name column in result tables.
pub fn name_width<'a>(names: impl Iterator<Item = &'a str>) -> usize {
    names.map(str::len).max().unwrap_or(0).max("NAME".len())
}
