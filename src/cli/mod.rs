//! CLI module for Workflow Controls
//!
//! Provides subcommands operating on JSON fixtures:
//! - `resolve`: resolve the effective controls of a step
//! - `add-job`: run an `AddJobCommand` through the job pipeline
//! - `check-command`: validate an `AddJobCommand` without running it

pub mod fixture;
pub mod jobs;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::{AppConfig, DEFAULT_CONFIG_DIR};
use crate::domain::PriorityOrder;
use crate::infrastructure::logging;

/// Workflow Controls - layered step control resolution
#[derive(Parser)]
#[command(name = "workflow-controls")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default` and `local` configuration files
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Override the configured priority order (higher-wins | lower-wins)
    #[arg(long, global = true)]
    pub priority_order: Option<PriorityOrder>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve the effective controls of a step from a fixture
    Resolve(resolve::ResolveArgs),

    /// Queue a job from a fixture and print the prepared job
    AddJob(jobs::AddJobArgs),

    /// Validate an AddJobCommand JSON document
    CheckCommand(InputArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the JSON input
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Load configuration, apply CLI overrides and initialize logging
pub fn prepare(
    config_dir: &Path,
    priority_order: Option<PriorityOrder>,
) -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load_from(config_dir).context("Failed to load configuration")?;
    if let Some(order) = priority_order {
        config.resolver.priority_order = order;
    }

    logging::init_logging(&config.logging);
    Ok(config)
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = prepare(&cli.config_dir, cli.priority_order)?;

    match cli.command {
        Command::Resolve(args) => resolve::run(&config, args).await,
        Command::AddJob(args) => jobs::run_add(&config, args).await,
        Command::CheckCommand(args) => jobs::run_check(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_fails_on_bad_config_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("local.toml"),
            "[logging]\nformat = \"xml\"\n\n[resolver]\npriority_order = \"lower-wins\"\n",
        )
        .unwrap();

        let err = prepare(dir.path(), None).unwrap_err();

        assert!(err.to_string().contains("Failed to load configuration"));
    }

    #[test]
    fn test_prepare_applies_cli_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[resolver]\npriority_order = \"higher-wins\"\n",
        )
        .unwrap();

        let config = prepare(dir.path(), Some(PriorityOrder::LowerWins)).unwrap();

        assert_eq!(config.resolver.priority_order, PriorityOrder::LowerWins);
    }

    #[test]
    fn test_cli_parses_global_options() {
        let cli = Cli::try_parse_from([
            "workflow-controls",
            "check-command",
            "--input",
            "command.json",
            "--priority-order",
            "lower-wins",
        ])
        .unwrap();

        assert_eq!(cli.priority_order, Some(PriorityOrder::LowerWins));
        assert_eq!(cli.config_dir, PathBuf::from(DEFAULT_CONFIG_DIR));
        assert!(matches!(cli.command, Command::CheckCommand(_)));
    }
}
