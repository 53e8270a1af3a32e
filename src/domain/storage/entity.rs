//! Keys and records held by a `Storage` backend

use std::fmt::{Debug, Display};

use serde::{de::DeserializeOwned, Serialize};

/// Identifier a record is stored under
///
/// Keys are totally ordered so backends list records in key order.
pub trait StorageKey: Clone + Debug + Display + Ord + Send + Sync {}

/// A record with a stable key
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    type Key: StorageKey;

    fn key(&self) -> &Self::Key;
}
