//! Control-values repository backed by the generic storage layer

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::control_values::{
    ControlLevel, ControlScope, ControlValuesEntity, ControlValuesRepository,
};
use crate::domain::ids::{EnvironmentId, WorkflowId};
use crate::domain::storage::Storage;
use crate::domain::DomainError;

/// `ControlValuesRepository` over any `Storage<ControlValuesEntity>`
///
/// Writes are serialized so that two concurrent upserts for the same level
/// cannot both create a row.
pub struct StorageControlValuesRepository {
    storage: Arc<dyn Storage<ControlValuesEntity>>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for StorageControlValuesRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageControlValuesRepository").finish()
    }
}

impl StorageControlValuesRepository {
    pub fn new(storage: Arc<dyn Storage<ControlValuesEntity>>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    async fn rows_at_level(
        &self,
        scope: &ControlScope,
        level: ControlLevel,
    ) -> Result<Vec<ControlValuesEntity>, DomainError> {
        self.storage
            .find(&|e: &ControlValuesEntity| e.belongs_to(scope) && e.level() == level)
            .await
    }
}

#[async_trait]
impl ControlValuesRepository for StorageControlValuesRepository {
    async fn find_for_step(
        &self,
        scope: &ControlScope,
    ) -> Result<Vec<ControlValuesEntity>, DomainError> {
        let rows = self
            .storage
            .find(&|e: &ControlValuesEntity| e.belongs_to(scope))
            .await?;

        debug!(scope = %scope, rows = rows.len(), "Fetched control values");
        Ok(rows)
    }

    async fn find_by_level(
        &self,
        scope: &ControlScope,
        level: ControlLevel,
    ) -> Result<Option<ControlValuesEntity>, DomainError> {
        let mut rows = self.rows_at_level(scope, level).await?;

        if rows.len() > 1 {
            warn!(
                scope = %scope,
                level = %level,
                rows = rows.len(),
                "Multiple control-values rows share a level, using the latest"
            );
        }

        rows.sort_by_key(|e| e.updated_at());
        Ok(rows.pop())
    }

    async fn upsert(
        &self,
        entity: ControlValuesEntity,
    ) -> Result<ControlValuesEntity, DomainError> {
        let _guard = self.write_lock.lock().await;
        let existing = self.find_by_level(&entity.scope(), entity.level()).await?;

        match existing {
            Some(current) => {
                let replacement = entity
                    .with_id(current.id().clone())
                    .with_created_at(current.created_at());
                self.storage.update(replacement).await
            }
            None => self.storage.create(entity).await,
        }
    }

    async fn delete(&self, scope: &ControlScope, level: ControlLevel) -> Result<bool, DomainError> {
        let _guard = self.write_lock.lock().await;
        let rows = self.rows_at_level(scope, level).await?;

        let mut deleted = false;
        for row in rows {
            deleted |= self.storage.delete(row.id()).await?;
        }

        Ok(deleted)
    }

    async fn delete_for_workflow(
        &self,
        environment_id: &EnvironmentId,
        workflow_id: &WorkflowId,
    ) -> Result<usize, DomainError> {
        let _guard = self.write_lock.lock().await;
        let rows = self
            .storage
            .find(&|e: &ControlValuesEntity| {
                e.environment_id() == environment_id && e.workflow_id() == workflow_id
            })
            .await?;

        let mut removed = 0;
        for row in rows {
            if self.storage.delete(row.id()).await? {
                removed += 1;
            }
        }

        Ok(removed)
    }
}
