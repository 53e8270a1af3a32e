//! Command accepted by the job pipeline entry point

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::entity::JobEntity;
use crate::domain::controls::{validate_stateless_controls, StatelessControls};
use crate::domain::ids::JobId;

/// Adds a triggered job to the execution pipeline
///
/// `controls` is only present for stateless triggers and lives as long as
/// the job does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_job_id_matches"))]
pub struct AddJobCommand {
    pub job_id: JobId,

    #[validate(nested)]
    pub job: JobEntity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_stateless_controls"))]
    pub controls: Option<StatelessControls>,
}

impl AddJobCommand {
    pub fn new(job: JobEntity) -> Self {
        Self {
            job_id: job.id().clone(),
            job,
            controls: None,
        }
    }

    pub fn with_controls(mut self, controls: StatelessControls) -> Self {
        self.controls = Some(controls);
        self
    }
}

fn validate_job_id_matches(command: &AddJobCommand) -> Result<(), ValidationError> {
    if &command.job_id != command.job.id() {
        return Err(ValidationError::new("job_id_mismatch").with_message(
            format!(
                "job_id '{}' does not match job '{}'",
                command.job_id,
                command.job.id()
            )
            .into(),
        ));
    }

    Ok(())
}
