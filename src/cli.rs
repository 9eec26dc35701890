//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use monhang::logging;
use monhang::output::OutputConfig;

use crate::commands;

/// monhang - Clone, update and run commands across a tree of git repositories
#[derive(Parser, Debug)]
#[command(name = "monhang")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone or update every component declared in the manifest
    #[command(visible_alias = "ws-sync")]
    Sync(commands::sync::SyncArgs),

    /// Fetch a project and its dependencies in dependency order
    Boot(commands::boot::BootArgs),

    /// Run a command in every component directory
    Exec(commands::exec::ExecArgs),

    /// Run a git operation across every component
    Git(commands::git::GitArgs),

    /// Display the component tree
    Tree(commands::tree::TreeArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        let level = logging::parse_level(&self.log_level).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid log level: {}\n\n\
                 hint: Use one of off, error, warn, info, debug, trace",
                self.log_level
            )
        })?;
        logging::init(level);

        let output = OutputConfig::from_env_and_flag(&self.color);
        console::set_colors_enabled(output.use_color);
        console::set_colors_enabled_stderr(output.use_color);

        match self.command {
            Commands::Sync(args) => commands::sync::execute(args, &output),
            Commands::Boot(args) => commands::boot::execute(args, &output),
            Commands::Exec(args) => commands::exec::execute(args, &output),
            Commands::Git(args) => commands::git::execute(args, &output),
            Commands::Tree(args) => commands::tree::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
