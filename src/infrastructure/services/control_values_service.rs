//! Control values service - CRUD for persisted control layers

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::domain::controls::validate_controls;
use crate::domain::{
    ControlLevel, ControlScope, ControlValuesEntity, ControlValuesRepository, DomainError,
    EnvironmentId, WorkflowId,
};

/// Request to create or replace the controls stored at one level
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertControlValuesRequest {
    pub scope: ControlScope,
    pub level: ControlLevel,
    #[serde(default)]
    pub priority: i32,
    #[validate(custom(function = "validate_controls_object"))]
    pub controls: Value,
}

impl UpsertControlValuesRequest {
    pub fn new(scope: ControlScope, level: ControlLevel, controls: Value) -> Self {
        Self {
            scope,
            level,
            priority: 0,
            controls,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

fn validate_controls_object(controls: &Value) -> Result<(), ValidationError> {
    match controls {
        Value::Object(map) => validate_controls(map),
        _ => Err(ValidationError::new("controls_not_object")
            .with_message("controls must be a JSON object".into())),
    }
}

/// Control values service for managing persisted layers
pub struct ControlValuesService {
    repository: Arc<dyn ControlValuesRepository>,
}

impl std::fmt::Debug for ControlValuesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlValuesService").finish()
    }
}

impl ControlValuesService {
    pub fn new(repository: Arc<dyn ControlValuesRepository>) -> Self {
        Self { repository }
    }

    /// Create or replace the controls stored at the request's level
    pub async fn upsert(
        &self,
        request: UpsertControlValuesRequest,
    ) -> Result<ControlValuesEntity, DomainError> {
        request.validate()?;

        let controls = match request.controls {
            Value::Object(map) => map,
            _ => return Err(DomainError::validation("controls must be a JSON object")),
        };

        let entity = ControlValuesEntity::new(request.scope, request.level, controls)
            .with_priority(request.priority);
        let saved = self.repository.upsert(entity).await?;

        info!(
            scope = %saved.scope(),
            level = %saved.level(),
            controls = saved.controls().len(),
            "Stored control values"
        );

        Ok(saved)
    }

    /// All persisted layers of a step
    pub async fn get_for_step(
        &self,
        scope: &ControlScope,
    ) -> Result<Vec<ControlValuesEntity>, DomainError> {
        self.repository.find_for_step(scope).await
    }

    /// The layer stored at `level`, or `NotFound`
    pub async fn get_level(
        &self,
        scope: &ControlScope,
        level: ControlLevel,
    ) -> Result<ControlValuesEntity, DomainError> {
        self.repository
            .find_by_level(scope, level)
            .await?
            .ok_or_else(|| {
                DomainError::not_found(format!("No {} controls for step '{}'", level, scope))
            })
    }

    pub async fn delete(&self, scope: &ControlScope, level: ControlLevel) -> Result<bool, DomainError> {
        self.repository.delete(scope, level).await
    }

    /// Removes every layer of a workflow, used when the workflow is deleted
    pub async fn delete_for_workflow(
        &self,
        environment_id: &EnvironmentId,
        workflow_id: &WorkflowId,
    ) -> Result<usize, DomainError> {
        let removed = self
            .repository
            .delete_for_workflow(environment_id, workflow_id)
            .await?;

        info!(
            environment_id = %environment_id,
            workflow_id = %workflow_id,
            removed,
            "Deleted workflow control values"
        );

        Ok(removed)
    }
}
