//! Keyed record store used by the job and control-values repositories

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::StorageEntity;

/// Predicate used by [`Storage::find`]
pub type EntityFilter<'a, E> = &'a (dyn Fn(&E) -> bool + Send + Sync);

/// Record store keyed by `E::Key`
///
/// `create` fails with `Conflict` when the key is taken, `update` with
/// `NotFound` when it is missing.
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Every record, in key order
    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Records matching `filter`, in key order
    async fn find(&self, filter: EntityFilter<'_, E>) -> Result<Vec<E>, DomainError> {
        Ok(self.list().await?.into_iter().filter(|e| filter(e)).collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError>;

    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Returns whether a record was removed
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;
}
