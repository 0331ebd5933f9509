use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Record, Store, StoreError};

/// Process-local store backed by an insertion-ordered `Vec`
pub struct MemoryStore<T> {
    records: RwLock<Vec<T>>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// First unique field of `record` already held by a record with another key
fn taken_field<T: Record>(records: &[T], record: &T) -> Option<&'static str> {
    let key = record.key();
    let fields = record.unique_fields();
    records
        .iter()
        .filter(|other| other.key() != key)
        .flat_map(|other| other.unique_fields())
        .find_map(|held| fields.iter().find(|field| **field == held).map(|(name, _)| *name))
}

#[async_trait]
impl<T: Record> Store<T> for MemoryStore<T> {
    async fn all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.records.read().await.clone())
    }

    async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.key() == id).cloned())
    }

    async fn insert(&self, record: T) -> Result<T, StoreError> {
        let mut records = self.records.write().await;
        let key = record.key();
        if records.iter().any(|r| r.key() == key) {
            return Err(StoreError::Duplicate {
                resource: T::RESOURCE,
                id: key,
            });
        }
        if let Some(field) = taken_field(&records, &record) {
            return Err(StoreError::Taken {
                resource: T::RESOURCE,
                field,
            });
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn replace(&self, record: T) -> Result<Option<T>, StoreError> {
        let mut records = self.records.write().await;
        if let Some(field) = taken_field(&records, &record) {
            return Err(StoreError::Taken {
                resource: T::RESOURCE,
                field,
            });
        }
        let key = record.key();
        match records.iter_mut().find(|r| r.key() == key) {
            Some(slot) => {
                *slot = record.clone();
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn remove(&self, id: &str) -> Result<Option<T>, StoreError> {
        let mut records = self.records.write().await;
        Ok(records
            .iter()
            .position(|r| r.key() == id)
            .map(|index| records.remove(index)))
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let count = records.len();
        records.clear();
        Ok(count)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
