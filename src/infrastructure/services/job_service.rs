//! Job service - entry point of the execution pipeline

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use validator::Validate;

use super::ResolutionService;
use crate::domain::storage::Storage;
use crate::domain::{AddJobCommand, DomainError, JobEntity, JobId, JobStatus, ResolvedControls};

/// A queued job together with the controls its step executes with
///
/// Stateless overrides of the command are folded into `controls` and are not
/// kept anywhere else.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedJob {
    pub job: JobEntity,
    pub controls: ResolvedControls,
}

/// Accepts triggered jobs and drives their lifecycle
pub struct JobService {
    jobs: Arc<dyn Storage<JobEntity>>,
    resolution: Arc<ResolutionService>,
}

impl std::fmt::Debug for JobService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobService").finish()
    }
}

impl JobService {
    pub fn new(jobs: Arc<dyn Storage<JobEntity>>, resolution: Arc<ResolutionService>) -> Self {
        Self { jobs, resolution }
    }

    /// Validate, resolve and queue a job
    ///
    /// A job id is accepted once; adding it again is a conflict.
    pub async fn add(&self, command: AddJobCommand) -> Result<PreparedJob, DomainError> {
        command.validate()?;

        let AddJobCommand { job, controls, .. } = command;

        if job.status() != JobStatus::Pending {
            return Err(DomainError::validation(format!(
                "Job '{}' must be pending to be added, found {}",
                job.id(),
                job.status()
            )));
        }

        let resolved = self
            .resolution
            .resolve_step(&job.control_scope(), controls.as_ref())
            .await?;

        let mut job = job;
        job.transition_to(JobStatus::Queued)?;
        let job = self.jobs.create(job).await.map_err(|e| match e {
            DomainError::Conflict { .. } => DomainError::conflict("Job has already been added"),
            other => other,
        })?;

        info!(
            job_id = %job.id(),
            workflow_id = %job.workflow_id(),
            step_id = %job.step_id(),
            stateless = controls.is_some(),
            controls = resolved.len(),
            "Job queued"
        );

        Ok(PreparedJob {
            job,
            controls: resolved,
        })
    }

    pub async fn get(&self, job_id: &JobId) -> Result<Option<JobEntity>, DomainError> {
        self.jobs.get(job_id).await
    }

    /// Apply a lifecycle transition to a stored job
    pub async fn transition(&self, job_id: &JobId, status: JobStatus) -> Result<JobEntity, DomainError> {
        let mut job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Job '{}' not found", job_id)))?;

        job.transition_to(status)?;
        self.jobs.update(job).await
    }
}
