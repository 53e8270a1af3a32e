//! Control-values repository trait

use async_trait::async_trait;

use super::entity::{ControlScope, ControlValuesEntity};
use super::level::ControlLevel;
use crate::domain::error::DomainError;
use crate::domain::ids::{EnvironmentId, WorkflowId};

#[cfg(test)]
use mockall::automock;

/// Persistence seam for control values
///
/// Implementations keep at most one entity per level for a given step.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ControlValuesRepository: Send + Sync {
    /// All rows stored for the step, in no particular order
    async fn find_for_step(
        &self,
        scope: &ControlScope,
    ) -> Result<Vec<ControlValuesEntity>, DomainError>;

    /// The row stored at `level` for the step, if any
    async fn find_by_level(
        &self,
        scope: &ControlScope,
        level: ControlLevel,
    ) -> Result<Option<ControlValuesEntity>, DomainError>;

    /// Creates the row, or replaces the one already stored at the same level
    async fn upsert(
        &self,
        entity: ControlValuesEntity,
    ) -> Result<ControlValuesEntity, DomainError>;

    /// Deletes the row stored at `level`, returns true if one existed
    async fn delete(
        &self,
        scope: &ControlScope,
        level: ControlLevel,
    ) -> Result<bool, DomainError>;

    /// Deletes every row of a workflow, returns the number removed
    async fn delete_for_workflow(
        &self,
        environment_id: &EnvironmentId,
        workflow_id: &WorkflowId,
    ) -> Result<usize, DomainError>;
}
