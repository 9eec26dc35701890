//! # Exec Command Implementation
//!
//! This module implements the `exec` subcommand, which runs one command in
//! every component directory declared in the manifest.
//!
//! The command follows `--` and is run directly, without a shell. Output is
//! printed per component once its command finishes; with `--live` each line
//! is printed as it arrives, prefixed with `[component]`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use monhang::defaults::DEFAULT_MANIFEST_FILENAME;
use monhang::exec::{CommandResult, RepoExecutor};
use monhang::output::{dim, emoji, paint_success, OutputConfig};
use monhang::suggestions;
use monhang::sync::Concurrency;

/// Run a command in every component directory
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Path to the manifest file.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "MONHANG_CONFIG",
        default_value = DEFAULT_MANIFEST_FILENAME
    )]
    pub config: PathBuf,

    /// Directory the components live in.
    ///
    /// Defaults to the directory containing the manifest.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Run in all components concurrently.
    #[arg(short, long)]
    pub parallel: bool,

    /// Print output lines as they are produced.
    #[arg(short, long)]
    pub live: bool,

    /// The command to run, after `--`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Execute the `exec` command.
pub fn execute(args: ExecArgs, output: &OutputConfig) -> Result<()> {
    let command = args.command.join(" ");
    if command.trim().is_empty() {
        return Err(suggestions::empty_command());
    }

    let workspace = super::load_workspace(&args.config, args.root.as_deref())?;
    let items = workspace.tree.work_list();

    let executor = if args.live {
        RepoExecutor::live(Arc::new(|name: &str, line: &str| {
            println!("[{}] {}", name, line);
        }))
    } else {
        RepoExecutor::new()
    };

    println!(
        "{} Running '{}' in {}",
        emoji(output, "▶️", "[EXEC]"),
        command,
        workspace.root.display()
    );
    let concurrency = Concurrency::from_flags(args.parallel, None);
    let results = executor.run_all(&workspace.root, &items, &command, concurrency)?;

    print_results(&results, args.live, output);
    let summary = executor.summary()?;
    println!();
    println!("{} succeeded, {} failed", summary.succeeded, summary.failed);
    if summary.has_failures() {
        return Err(suggestions::components_failed(
            summary.failed,
            results.len(),
            "run the command",
        ));
    }
    Ok(())
}

fn print_results(results: &[CommandResult], live: bool, output: &OutputConfig) {
    for result in results {
        let duration = result
            .duration()
            .map(|d| format!("{:.2}s", d.as_secs_f64()))
            .unwrap_or_default();
        println!();
        println!(
            "== {} {} {}",
            result.name,
            paint_success(output, result.success()),
            dim(output, &format!("(exit {}, {})", result.exit_code, duration))
        );
        // Live mode already printed every line.
        if !live && !result.output.is_empty() {
            print!("{}", result.output);
            if !result.output.ends_with('\n') {
                println!();
            }
        }
        if let Some(error) = &result.error {
            println!("   error: {}", error);
        }
    }
}
