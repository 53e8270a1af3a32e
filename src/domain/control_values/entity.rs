//! Persisted control-values entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::level::ControlLevel;
use crate::domain::controls::Controls;
use crate::domain::ids::{ControlValuesId, EnvironmentId, OrganizationId, StepId, WorkflowId};
use crate::domain::storage::StorageEntity;

/// Query key for the control-values rows of one step
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlScope {
    pub environment_id: EnvironmentId,
    pub organization_id: OrganizationId,
    pub workflow_id: WorkflowId,
    pub step_id: StepId,
}

impl ControlScope {
    pub fn new(
        environment_id: EnvironmentId,
        organization_id: OrganizationId,
        workflow_id: WorkflowId,
        step_id: StepId,
    ) -> Self {
        Self {
            environment_id,
            organization_id,
            workflow_id,
            step_id,
        }
    }

    /// Same tenancy and workflow, different step
    pub fn for_step(&self, step_id: StepId) -> Self {
        Self {
            step_id,
            ..self.clone()
        }
    }
}

impl std::fmt::Display for ControlScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.environment_id, self.organization_id, self.workflow_id, self.step_id
        )
    }
}

/// A bundle of control values stored at one level for one step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlValuesEntity {
    id: ControlValuesId,

    environment_id: EnvironmentId,

    organization_id: OrganizationId,

    workflow_id: WorkflowId,

    step_id: StepId,

    level: ControlLevel,

    /// Precedence within the step, direction is decided by the resolver
    #[serde(default)]
    priority: i32,

    #[serde(default)]
    controls: Controls,

    created_at: DateTime<Utc>,

    updated_at: DateTime<Utc>,
}

impl ControlValuesEntity {
    /// Create a new entity with a generated ID and priority 0
    pub fn new(scope: ControlScope, level: ControlLevel, controls: Controls) -> Self {
        let now = Utc::now();
        Self {
            id: ControlValuesId::generate(),
            environment_id: scope.environment_id,
            organization_id: scope.organization_id,
            workflow_id: scope.workflow_id,
            step_id: scope.step_id,
            level,
            priority: 0,
            controls,
            created_at: now,
            updated_at: now,
        }
    }

    // Builder methods

    pub fn with_id(mut self, id: ControlValuesId) -> Self {
        self.id = id;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    // Getters

    pub fn id(&self) -> &ControlValuesId {
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

    pub fn level(&self) -> ControlLevel {
        self.level
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn scope(&self) -> ControlScope {
        ControlScope::new(
            self.environment_id.clone(),
            self.organization_id.clone(),
            self.workflow_id.clone(),
            self.step_id.clone(),
        )
    }

    /// True when this row belongs to the given step
    pub fn belongs_to(&self, scope: &ControlScope) -> bool {
        self.environment_id == scope.environment_id
            && self.organization_id == scope.organization_id
            && self.workflow_id == scope.workflow_id
            && self.step_id == scope.step_id
    }
}

impl StorageEntity for ControlValuesEntity {
    type Key = ControlValuesId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
