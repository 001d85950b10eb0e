//! Command dispatch for the sgweave CLI.

use std::{fs, path::Path};

use anyhow::Result;

use super::args::{Arguments, BuildCommand, Command};
use crate::config::{CONFIG_FILE_NAME, default_config_json, load_config};
use crate::feedback::Feedback;
use crate::processing::processor::{BuildSummary, ProjectProcessor};

/// What one CLI invocation produced, handed to the report printer.
pub struct RunResult {
    pub summary: RunSummary,
    pub feedback: Vec<Feedback>,
}

pub enum RunSummary {
    Build(BuildSummary),
    Init { created: bool },
}

pub fn run(Arguments { command }: Arguments) -> Result<RunResult> {
    match command {
        Some(Command::Build(cmd)) => build(cmd),
        Some(Command::Init) => {
            init()?;
            Ok(RunResult {
                summary: RunSummary::Init { created: true },
                feedback: Vec::new(),
            })
        }
        None => {
            anyhow::bail!("No command provided. Use --help to see available commands.")
        }
    }
}

fn build(cmd: BuildCommand) -> Result<RunResult> {
    let mut config = load_config(cmd.common.config.as_deref())?;
    if let Some(source_root) = &cmd.common.source_root {
        config.source_root = source_root.to_string_lossy().into_owned();
    }
    if let Some(output_root) = &cmd.common.output_root {
        config.output_root = Some(output_root.to_string_lossy().into_owned());
    }

    let mut processor = ProjectProcessor::new(config);
    let summary = processor.process()?;
    Ok(RunResult {
        summary: RunSummary::Build(summary),
        feedback: processor.into_feedback().into_entries(),
    })
}

fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", CONFIG_FILE_NAME);
    }

    fs::write(config_path, default_config_json()?)?;
    Ok(())
}
