use async_trait::async_trait;
use shared::Resource;
use std::sync::RwLock;

use super::{Store, StoreError};

/// Insertion-ordered store for development and tests.
#[derive(Debug)]
pub struct InMemoryStore<E> {
    inner: RwLock<Vec<E>>,
}

impl<E> InMemoryStore<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }
}

impl<E> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Resource> Store<E> for InMemoryStore<E> {
    async fn find_all(&self) -> Result<Vec<E>, StoreError> {
        let records = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.clone())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<E>, StoreError> {
        let records = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.iter().find(|e| e.id() == id).cloned())
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
        let records = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.iter().any(|e| e.id() == id))
    }

    async fn save(&self, entity: E) -> Result<E, StoreError> {
        let mut records = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        match records.iter_mut().find(|e| e.id() == entity.id()) {
            Some(slot) => *slot = entity.clone(),
            None => records.push(entity.clone()),
        }
        Ok(entity)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
        let mut records = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        records.retain(|e| e.id() != id);
        Ok(())
    }

    async fn next_id(&self) -> Result<i32, StoreError> {
        let records = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        records
            .iter()
            .map(|e| e.id())
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(StoreError::IdentitiesExhausted)
    }
}
