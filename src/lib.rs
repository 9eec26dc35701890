//! # monhang
//!
//! This library provides the core functionality for managing a tree of git
//! repositories declared in a manifest: cloning or updating each one, running
//! commands across all of them, and reporting progress while that happens.
//! It is designed to be used by the `monhang` command-line tool but can also
//! be integrated into other applications.
//!
//! ## Quick Example
//!
//! ```
//! use monhang::manifest;
//! use monhang::tree::ComponentTree;
//!
//! let root = manifest::parse_json(r#"{
//!     "name": "workspace",
//!     "components": [
//!         {"source": "git://github.com/org/core.git?version=v1.0.0"},
//!         {"name": "docs", "source": "git@github.com:org/docs.git"}
//!     ]
//! }"#).unwrap();
//!
//! let items = ComponentTree::from_root(&root).work_list();
//! assert_eq!(items[0].name, "core");
//! assert_eq!(items[0].version(), "v1.0.0");
//! assert_eq!(
//!     items[0].source.as_ref().unwrap().url,
//!     "https://github.com/org/core.git"
//! );
//! assert_eq!(items[1].source.as_ref().unwrap().url, "git@github.com:org/docs.git");
//! ```
//!
//! ## Core Concepts
//!
//! - **Sources (`source`)**: A component's source descriptor is a URL or SCP
//!   location carrying an optional `version` and `type` in its query string.
//!   Resolution never fails; unrecognized input only loses its query string.
//! - **Component Tree (`tree`)**: Nested manifest components are stored in an
//!   index-addressed arena and flattened in pre-order into work items.
//! - **Dependency Graph (`graph`)**: Project manifests declare build, runtime
//!   and install dependencies; the graph is sorted so dependencies come first
//!   and cycles are rejected.
//! - **VCS Operations (`vcs`, `git`)**: Every git invocation goes through the
//!   `VcsOperations` trait, implemented over the system `git` binary.
//! - **Sync Engine (`sync`)**: Clones missing working trees and updates
//!   existing ones, sequentially or in parallel, recording each component's
//!   lifecycle in the result store (`results`).
//! - **Executors (`exec`, `bulk`)**: Run an arbitrary command or a git
//!   operation in every component directory.
//!
//! ## Execution Flow
//!
//! A `sync` run goes through the following steps:
//!
//! 1.  **Load**: Decode and validate the manifest (`manifest`).
//! 2.  **Flatten**: Build the component tree and its pre-order work list.
//! 3.  **Sync**: For each component, record it as in progress, clone or
//!     update it, and record the terminal state.
//! 4.  **Observe**: Meanwhile a presentation layer polls snapshots of the
//!     result store on a fixed interval (`progress`).
//!
//! A failing component never stops the others; the run reports failures
//! through the final counts.

pub mod bulk;
pub mod defaults;
pub mod error;
pub mod exec;
pub mod git;
pub mod graph;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod progress;
pub mod results;
pub mod source;
pub mod suggestions;
pub mod sync;
pub mod tree;
pub mod vcs;

#[cfg(test)]
mod source_proptest;
