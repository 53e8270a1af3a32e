//! In-memory storage implementation

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::storage::{EntityFilter, Storage, StorageEntity};
use crate::domain::DomainError;

/// Thread-safe in-memory storage implementation
///
/// Backs the CLI and tests. Data is lost when the process terminates.
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: RwLock<BTreeMap<E::Key, E>>,
}

impl<E> Default for InMemoryStorage<E>
where
    E: StorageEntity,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> InMemoryStorage<E>
where
    E: StorageEntity,
{
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
        }
    }

    /// Creates storage pre-populated with entities
    pub fn with_entities(entities: Vec<E>) -> Self {
        let map = entities
            .into_iter()
            .map(|entity| (entity.key().clone(), entity))
            .collect();

        Self {
            entities: RwLock::new(map),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, BTreeMap<E::Key, E>>, DomainError> {
        self.entities
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<E::Key, E>>, DomainError> {
        self.entities
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self.read_lock()?.get(key).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(self.read_lock()?.values().cloned().collect())
    }

    async fn find(&self, filter: EntityFilter<'_, E>) -> Result<Vec<E>, DomainError> {
        Ok(self
            .read_lock()?
            .values()
            .filter(|e| filter(e))
            .cloned()
            .collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let mut entities = self.write_lock()?;

        if entities.contains_key(entity.key()) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                entity.key()
            )));
        }

        entities.insert(entity.key().clone(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let mut entities = self.write_lock()?;

        match entities.get_mut(entity.key()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                entity.key()
            ))),
        }
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.write_lock()?.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::control_values::{ControlLevel, ControlScope, ControlValuesEntity};
    use crate::domain::controls::Controls;
    use crate::domain::ids::{ControlValuesId, EnvironmentId, OrganizationId, StepId, WorkflowId};
    use std::sync::Arc;

    fn entity(id: &str, step: &str, priority: i32) -> ControlValuesEntity {
        ControlValuesEntity::new(
            ControlScope::new(
                EnvironmentId::new("env-1").unwrap(),
                OrganizationId::new("org-1").unwrap(),
                WorkflowId::new("welcome").unwrap(),
                StepId::new(step).unwrap(),
            ),
            ControlLevel::StepOverride,
            Controls::new(),
        )
        .with_id(ControlValuesId::new(id).unwrap())
        .with_priority(priority)
    }

    fn key(id: &str) -> ControlValuesId {
        ControlValuesId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let storage: InMemoryStorage<ControlValuesEntity> = InMemoryStorage::new();
        let e = entity("cv-1", "email", 1);

        storage.create(e.clone()).await.unwrap();

        let result = storage.get(&key("cv-1")).await.unwrap();
        assert_eq!(result, Some(e));
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let storage: InMemoryStorage<ControlValuesEntity> = InMemoryStorage::new();
        let e = entity("cv-1", "email", 1);

        storage.create(e.clone()).await.unwrap();
        let result = storage.create(e).await;

        assert!(matches!(result.unwrap_err(), DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let storage: InMemoryStorage<ControlValuesEntity> = InMemoryStorage::new();

        let result = storage.update(entity("cv-1", "email", 1)).await;

        assert!(matches!(result.unwrap_err(), DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_replaces() {
        let storage = InMemoryStorage::with_entities(vec![entity("cv-1", "email", 1)]);

        storage.update(entity("cv-1", "email", 7)).await.unwrap();

        let stored = storage.get(&key("cv-1")).await.unwrap().unwrap();
        assert_eq!(stored.priority(), 7);
        assert_eq!(storage.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_is_key_ordered() {
        let storage = InMemoryStorage::with_entities(vec![
            entity("cv-3", "email", 0),
            entity("cv-1", "email", 0),
            entity("cv-2", "sms", 0),
        ]);

        let ids: Vec<String> = storage
            .list()
            .await
            .unwrap()
            .iter()
            .map(|e| e.id().to_string())
            .collect();

        assert_eq!(ids, vec!["cv-1", "cv-2", "cv-3"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = InMemoryStorage::with_entities(vec![entity("cv-1", "email", 1)]);

        assert!(storage.delete(&key("cv-1")).await.unwrap());
        assert_eq!(storage.get(&key("cv-1")).await.unwrap(), None);
        assert!(!storage.delete(&key("cv-1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_find() {
        let storage = InMemoryStorage::with_entities(vec![
            entity("cv-1", "email", 1),
            entity("cv-2", "email", 2),
            entity("cv-3", "sms", 3),
        ]);

        let email = storage
            .find(&|e: &ControlValuesEntity| e.step_id().as_str() == "email")
            .await
            .unwrap();

        assert_eq!(email.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_access() {
        let storage: Arc<InMemoryStorage<ControlValuesEntity>> = Arc::new(InMemoryStorage::new());

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage.create(entity(&format!("cv-{}", i), "email", i)).await
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(storage.list().await.unwrap().len(), 10);
    }
}
