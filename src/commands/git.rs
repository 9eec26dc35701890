//! # Git Command Implementation
//!
//! This module implements the `git` subcommand, which applies one git
//! operation to every component working tree and prints a table with the
//! branch, commit and a short status per component.
//!
//! ```bash
//! monhang git status
//! monhang git pull --parallel
//! monhang git checkout main
//! monhang git branch feat/new-feature
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use monhang::bulk::{GitExecutor, GitOpResult, GitOperation};
use monhang::defaults::DEFAULT_MANIFEST_FILENAME;
use monhang::output::{dim, emoji, paint_success, OutputConfig};
use monhang::suggestions;
use monhang::sync::Concurrency;

/// Run a git operation across every component
#[derive(Args, Debug)]
pub struct GitArgs {
    #[command(subcommand)]
    pub operation: GitCommand,

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

    /// Run the operation in all components concurrently.
    #[arg(short, long)]
    pub parallel: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GitCommand {
    /// Show the status of every component
    Status,
    /// Pull updates for every component
    Pull,
    /// Fetch updates for every component
    Fetch,
    /// Check out an existing branch in every component
    Checkout {
        /// Branch to check out
        branch: String,
    },
    /// Create and check out a new branch in every component
    Branch {
        /// Branch to create
        branch: String,
    },
}

impl From<GitCommand> for GitOperation {
    fn from(command: GitCommand) -> Self {
        match command {
            GitCommand::Status => GitOperation::Status,
            GitCommand::Pull => GitOperation::Pull,
            GitCommand::Fetch => GitOperation::Fetch,
            GitCommand::Checkout { branch } => GitOperation::Checkout(branch),
            GitCommand::Branch { branch } => GitOperation::Branch(branch),
        }
    }
}

/// Execute the `git` command.
pub fn execute(args: GitArgs, output: &OutputConfig) -> Result<()> {
    let workspace = super::load_workspace(&args.config, args.root.as_deref())?;
    let items = workspace.tree.work_list();
    let operation = GitOperation::from(args.operation);

    println!(
        "{} git {} in {}",
        emoji(output, "🌿", "[GIT]"),
        operation,
        workspace.root.display()
    );
    let executor = GitExecutor::new();
    let results = executor.run_all(
        &workspace.root,
        &items,
        &operation,
        Concurrency::from_flags(args.parallel, None),
    )?;

    print_results(&results, output);
    let failed = executor.failures()?;
    if failed > 0 {
        return Err(suggestions::components_failed(
            failed,
            results.len(),
            operation.label(),
        ));
    }
    Ok(())
}

fn print_results(results: &[GitOpResult], output: &OutputConfig) {
    let width = super::name_width(results.iter().map(|r| r.name.as_str()));
    let branch_width = results
        .iter()
        .map(|r| r.branch.len())
        .max()
        .unwrap_or(0)
        .max("BRANCH".len());

    println!();
    println!(
        "  {:width$}  {:branch_width$}  {:7}  STATUS",
        "NAME",
        "BRANCH",
        "COMMIT",
        width = width,
        branch_width = branch_width
    );
    for result in results {
        let status = match &result.error {
            Some(error) => format!(
                "{} {}",
                paint_success(output, false),
                error.lines().next().unwrap_or_default()
            ),
            None => result.status.clone(),
        };
        println!(
            "  {:width$}  {:branch_width$}  {}  {}",
            result.name,
            result.branch,
            dim(output, &format!("{:7}", result.commit)),
            status,
            width = width,
            branch_width = branch_width
        );
    }
}
