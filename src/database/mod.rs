//! Record storage: an async `Store` trait with in-memory and PostgreSQL
//! implementations, and the `Collection` handle handlers work with.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A storable resource record
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Resource name, also the route segment (`/api/<resource>`)
    const RESOURCE: &'static str;

    /// Primary key rendered as text
    fn key(&self) -> String;

    /// Secondary values no two records may share, as `(field, normalized value)`
    fn unique_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{resource} '{id}' already exists")]
    Duplicate { resource: &'static str, id: String },

    #[error("{resource} {field} already taken")]
    Taken { resource: &'static str, field: &'static str },

    #[error("Storage connection error: {0}")]
    Connection(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence for one resource. Records keep insertion order.
#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    async fn all(&self) -> Result<Vec<T>, StoreError>;

    async fn find(&self, id: &str) -> Result<Option<T>, StoreError>;

    /// Fails with `StoreError::Duplicate` if the key is taken and
    /// `StoreError::Taken` if another record holds one of its unique fields
    async fn insert(&self, record: T) -> Result<T, StoreError>;

    /// Overwrite the record with the same key; `None` if it no longer exists.
    /// Unique fields are checked against every other record.
    async fn replace(&self, record: T) -> Result<Option<T>, StoreError>;

    async fn remove(&self, id: &str) -> Result<Option<T>, StoreError>;

    /// Remove every record, returning how many there were
    async fn clear(&self) -> Result<usize, StoreError>;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.all().await?.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str;
}

/// A resource store plus the integer id sequence for numerically keyed records
pub struct Collection<T: Record> {
    store: Arc<dyn Store<T>>,
    sequence: Arc<AtomicU64>,
}

impl<T: Record> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sequence: Arc::clone(&self.sequence),
        }
    }
}

impl<T: Record> Collection<T> {
    /// Wrap a store, starting the sequence after the largest numeric key present
    pub async fn open(store: Arc<dyn Store<T>>) -> Result<Self, StoreError> {
        let next = store
            .all()
            .await?
            .iter()
            .filter_map(|r| r.key().parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);

        Ok(Self {
            store,
            sequence: Arc::new(AtomicU64::new(next)),
        })
    }

    pub fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }
}

impl<T: Record> Deref for Collection<T> {
    type Target = dyn Store<T>;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Project;
    use crate::models::ProjectStatus;
    use chrono::Utc;

    fn project(id: u64) -> Project {
        Project {
            id,
            name: format!("Project {}", id),
            description: "test".into(),
            status: ProjectStatus::Planning,
            user_id: 1,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn sequence_starts_after_existing_ids() {
        let store = Arc::new(MemoryStore::<Project>::new());
        store.insert(project(3)).await.unwrap();
        store.insert(project(9)).await.unwrap();

        let collection = Collection::open(store).await.unwrap();
        assert_eq!(collection.next_id(), 10);
        assert_eq!(collection.next_id(), 11);
        assert_eq!(collection.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_collection_starts_at_one() {
        let collection = Collection::open(Arc::new(MemoryStore::<Project>::new())).await.unwrap();
        assert_eq!(collection.next_id(), 1);
        assert_eq!(collection.backend(), "memory");
    }
}
