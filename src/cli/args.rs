//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `build`: Run the preprocessor over a project tree
//! - `init`: Initialize an sgweave configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Build(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by commands that operate on a project.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Project source root directory (overrides config file)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Output directory for processed files (overrides config file)
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, env = "SGWEAVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct BuildCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process views and code units: resolve imports, inject script
    /// includes, extract bindings, apply namespaces
    Build(BuildCommand),
    /// Initialize a new sgweave.json configuration file
    Init,
}
