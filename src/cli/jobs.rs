//! `add-job` and `check-command` commands

use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use validator::Validate;

use super::fixture::{read_json, ControlsFixture};
use super::InputArgs;
use crate::config::AppConfig;
use crate::domain::AddJobCommand;
use crate::infrastructure::services::PreparedJob;

#[derive(Args, Debug, Clone)]
pub struct AddJobArgs {
    /// Controls fixture used to seed persisted layers
    #[arg(short, long)]
    pub input: PathBuf,

    /// AddJobCommand JSON document
    #[arg(short, long)]
    pub command: PathBuf,
}

pub async fn run_add(config: &AppConfig, args: AddJobArgs) -> anyhow::Result<()> {
    let prepared = add(config, &args).await?;
    println!("{}", serde_json::to_string_pretty(&prepared)?);
    Ok(())
}

/// Seeds the fixture and runs the command through `JobService::add`
async fn add(config: &AppConfig, args: &AddJobArgs) -> anyhow::Result<PreparedJob> {
    let fixture = ControlsFixture::load(&args.input)?;
    let command: AddJobCommand = read_json(&args.command)?;

    let state = crate::create_app_state(config);
    fixture.seed(&state).await?;

    Ok(state.jobs.add(command).await?)
}

pub fn run_check(args: InputArgs) -> anyhow::Result<()> {
    let command = check(&args)?;
    println!("AddJobCommand for job '{}' is valid", command.job_id);
    Ok(())
}

fn check(args: &InputArgs) -> anyhow::Result<AddJobCommand> {
    let command: AddJobCommand = read_json(&args.input)?;

    if let Err(errors) = command.validate() {
        bail!("Invalid AddJobCommand: {}", errors);
    }

    Ok(command)
}
