//! # Boot Command Implementation
//!
//! This module implements the `boot` subcommand, which sets up the workspace
//! for a project manifest that declares `build`, `runtime` and `install`
//! dependencies.
//!
//! The dependency graph is built and sorted first; a cycle aborts the command
//! before any repository is touched. Components are then synced one at a
//! time, dependencies before the components that need them. `--dry-run`
//! prints the order and stops.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use monhang::defaults::DEFAULT_MANIFEST_FILENAME;
use monhang::graph::DependencyGraph;
use monhang::logging::RunContext;
use monhang::manifest;
use monhang::output::{dim, emoji, OutputConfig};
use monhang::results::SyncState;
use monhang::suggestions;
use monhang::sync::SyncEngine;

/// Fetch a project and its dependencies in dependency order
#[derive(Args, Debug)]
pub struct BootArgs {
    /// Path to the project manifest.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "MONHANG_CONFIG",
        default_value = DEFAULT_MANIFEST_FILENAME
    )]
    pub config: PathBuf,

    /// Directory the components are fetched into.
    ///
    /// Defaults to the directory containing the manifest.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Print the order components would be fetched in without fetching.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `boot` command.
pub fn execute(args: BootArgs, output: &OutputConfig) -> Result<()> {
    let project = manifest::project_from_file(&args.config)
        .map_err(|e| super::manifest_error(&args.config, e))?;
    log::info!("project {} {} loaded", project.name, project.version);

    let graph = DependencyGraph::from_project(&project);
    let order = graph
        .topological_order()
        .map_err(suggestions::from_library)?;

    println!(
        "{} Boot order for {}:",
        emoji(output, "🥾", "[BOOT]"),
        project.name
    );
    for (position, node) in order.iter().enumerate() {
        let version = if node.version.is_empty() {
            "default branch"
        } else {
            node.version.as_str()
        };
        println!(
            "  {}. {} {} {}",
            position + 1,
            node.name,
            dim(output, &format!("@ {}", version)),
            dim(output, &node.clone_url())
        );
    }

    if args.dry_run {
        return Ok(());
    }

    let root = super::workspace_root(&args.config, args.root.as_deref());
    let engine = SyncEngine::new(&root).context(RunContext::new("boot"));
    engine.run_graph(&graph).map_err(suggestions::from_library)?;

    let records = engine.results().snapshot()?;
    super::sync::print_records(&records, output);
    let failed = records.iter().filter(|r| r.state == SyncState::Failed).count();
    if failed > 0 {
        return Err(suggestions::components_failed(failed, records.len(), "boot"));
    }
    Ok(())
}
