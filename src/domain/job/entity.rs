//! Job entity and lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::domain::control_values::ControlScope;
use crate::domain::controls::ControlsError;
use crate::domain::ids::{EnvironmentId, JobId, OrganizationId, StepId, WorkflowId};
use crate::domain::storage::StorageEntity;

/// Lifecycle of a job
///
/// `Pending -> Queued` happens once, when the trigger pipeline accepts the
/// job. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Queued,
    Running,
    Completed,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled
        )
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Queued)
                | (JobStatus::Queued, JobStatus::Running)
                | (JobStatus::Queued, JobStatus::Canceled)
                | (JobStatus::Running, JobStatus::Completed)
                | (JobStatus::Running, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Canceled)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_payload(payload: &Value) -> Result<(), ValidationError> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(ValidationError::new("payload_not_object")
            .with_message("job payload must be a JSON object".into()))
    }
}

/// One execution of a workflow step for a subscriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JobEntity {
    id: JobId,

    environment_id: EnvironmentId,

    organization_id: OrganizationId,

    workflow_id: WorkflowId,

    /// The step this job executes
    step_id: StepId,

    #[validate(length(min = 1, max = 128))]
    subscriber_id: String,

    #[validate(length(min = 1, max = 128))]
    transaction_id: String,

    #[serde(default = "empty_payload")]
    #[validate(custom(function = "validate_payload"))]
    payload: Value,

    #[serde(default)]
    status: JobStatus,

    created_at: DateTime<Utc>,

    updated_at: DateTime<Utc>,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

impl JobEntity {
    /// Create a pending job for the step named by `scope`
    pub fn new(
        scope: ControlScope,
        subscriber_id: impl Into<String>,
        transaction_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::generate(),
            environment_id: scope.environment_id,
            organization_id: scope.organization_id,
            workflow_id: scope.workflow_id,
            step_id: scope.step_id,
            subscriber_id: subscriber_id.into(),
            transaction_id: transaction_id.into(),
            payload: empty_payload(),
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    // Builder methods

    pub fn with_id(mut self, id: JobId) -> Self {
        self.id = id;
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    // Getters

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn environment_id(&self) -> &EnvironmentId {
        &self.environment_id
    }

    pub fn organization_id(&self) -> &OrganizationId {
        &self.organization_id
    }

    pub fn workflow_id(&self) -> &WorkflowId {
        &self.workflow_id
    }

    pub fn step_id(&self) -> &StepId {
        &self.step_id
    }

    pub fn subscriber_id(&self) -> &str {
        &self.subscriber_id
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Scope used to look up the step's persisted controls
    pub fn control_scope(&self) -> ControlScope {
        ControlScope::new(
            self.environment_id.clone(),
            self.organization_id.clone(),
            self.workflow_id.clone(),
            self.step_id.clone(),
        )
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition_to(&mut self, next: JobStatus) -> Result<(), ControlsError> {
        if !self.status.can_transition_to(next) {
            return Err(ControlsError::illegal_transition(
                self.status.as_str(),
                next.as_str(),
            ));
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl StorageEntity for JobEntity {
    type Key = JobId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
