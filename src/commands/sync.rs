//! # Sync Command Implementation
//!
//! This module implements the `sync` subcommand (alias `ws-sync`), which
//! brings every component declared in the manifest to its declared state.
//!
//! ## Functionality
//!
//! - **Clone or update**: missing working trees are cloned, existing ones are
//!   fetched and checked out (or pulled when no version is declared).
//! - **Parallelism**: `--parallel` syncs all components at once, `--jobs`
//!   caps the number of concurrent git processes.
//! - **Live progress**: on a terminal a spinner polls the result store while
//!   the sync runs in the background. Log output goes to a file meanwhile so
//!   it does not tear the display.
//!
//! Every component's final state is printed, even when some fail. Any failure
//! makes the command exit with a non-zero status.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use monhang::defaults::{default_log_dir, DEFAULT_MANIFEST_FILENAME, POLL_INTERVAL};
use monhang::logging::{self, RunContext};
use monhang::output::{dim, emoji, paint_state, OutputConfig};
use monhang::progress::{watch_results, SyncProgress};
use monhang::results::{SyncRecord, SyncState};
use monhang::suggestions;
use monhang::sync::{Concurrency, SyncEngine};
use monhang::tree::WorkItem;

/// Clone or update every component declared in the manifest
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the manifest file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "MONHANG_CONFIG",
        default_value = DEFAULT_MANIFEST_FILENAME
    )]
    pub config: PathBuf,

    /// Directory the components are synced into.
    ///
    /// Defaults to the directory containing the manifest.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Sync all components concurrently.
    #[arg(short, long)]
    pub parallel: bool,

    /// Maximum number of concurrent syncs with --parallel.
    #[arg(short, long, value_name = "N", requires = "parallel")]
    pub jobs: Option<usize>,

    /// Do not show the live progress display.
    #[arg(long)]
    pub no_progress: bool,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, output: &OutputConfig) -> Result<()> {
    let workspace = super::load_workspace(&args.config, args.root.as_deref())?;
    let items = workspace.tree.work_list();
    let total = SyncEngine::syncable(&items);
    if total == 0 {
        println!("No components with a source in {}", args.config.display());
        return Ok(());
    }

    let context = RunContext::new("sync");
    let engine = SyncEngine::new(&workspace.root)
        .concurrency(Concurrency::from_flags(args.parallel, args.jobs))
        .context(context.clone());

    println!(
        "{} Syncing {} components into {}",
        emoji(output, "🔄", "[SYNC]"),
        total,
        workspace.root.display()
    );

    let live = !args.no_progress && console::Term::stderr().is_term();
    let records = if live {
        run_live(engine, items, total, &context)?
    } else {
        engine.run(&items)?;
        engine.results().snapshot()?
    };

    print_records(&records, output);
    let failed = records.iter().filter(|r| r.state == SyncState::Failed).count();
    if failed > 0 {
        return Err(suggestions::components_failed(failed, records.len(), "sync"));
    }
    Ok(())
}

/// Runs the engine in the background and draws a spinner until it ends.
fn run_live(
    engine: SyncEngine,
    items: Vec<WorkItem>,
    total: usize,
    context: &RunContext,
) -> Result<Vec<SyncRecord>> {
    let guard = logging::redirect_to_file(&context.log_file(&default_log_dir()))?;
    let progress = SyncProgress::new(total);
    let handle = engine.spawn(items);

    let watched = watch_results(
        handle.results(),
        total,
        POLL_INTERVAL,
        || handle.is_finished(),
        |snapshot| progress.update(snapshot),
    );
    progress.finish();
    let joined = handle.join();

    let log_path = guard.path().to_path_buf();
    drop(guard);
    log::debug!("sync log written to {}", log_path.display());

    joined?;
    Ok(watched?)
}

/// Prints one line per record: name, state, then version or error.
pub fn print_records(records: &[SyncRecord], output: &OutputConfig) {
    let width = super::name_width(records.iter().map(|r| r.name.as_str()));
    println!();
    for record in records {
        let detail = match &record.error {
            Some(error) => error.lines().next().unwrap_or_default().to_string(),
            None => dim(output, &record.version),
        };
        // Pad the plain label so coloured and uncoloured columns line up.
        let state = paint_state(output, record.state);
        let padding = " ".repeat(11usize.saturating_sub(record.state.to_string().len()));
        println!(
            "  {:width$}  {}{}  {}",
            record.name,
            state,
            padding,
            detail,
            width = width
        );
    }

    let cloned = records.iter().filter(|r| r.state == SyncState::Cloned).count();
    let updated = records.iter().filter(|r| r.state == SyncState::Updated).count();
    let failed = records.iter().filter(|r| r.state == SyncState::Failed).count();
    println!();
    println!("{} cloned, {} updated, {} failed", cloned, updated, failed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_execute_missing_manifest() {
        let args = SyncArgs {
            config: PathBuf::from("/nonexistent/monhang.json"),
            root: None,
            parallel: false,
            jobs: None,
            no_progress: true,
        };

        let result = execute(args, &OutputConfig { use_color: false });
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Manifest not found"));
    }

    #[test]
    fn test_execute_without_sources_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("monhang.json");
        std::fs::write(
            &manifest,
            r#"{"name": "ws", "components": [{"name": "group"}]}"#,
        )
        .unwrap();

        let args = SyncArgs {
            config: manifest,
            root: None,
            parallel: false,
            jobs: None,
            no_progress: true,
        };
        execute(args, &OutputConfig { use_color: false }).unwrap();
        assert!(!temp.path().join("group").exists());
    }
}
