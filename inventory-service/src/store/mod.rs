//! Key-indexed persistence for the three record kinds.
//!
//! Services never talk to a backing directly; they receive a [`Stores`]
//! bundle through application state and reach the right [`Store`] for an
//! entity type via [`Stored`].

mod memory;
mod postgres;

use async_trait::async_trait;
use shared::{InventoryRecord, Movement, Product, Resource};
use std::sync::Arc;
use thiserror::Error;

pub use memory::InMemoryStore;
pub use postgres::{DbPool, PgStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(String),
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("in-memory store lock poisoned")]
    Poisoned,
    #[error("identity space exhausted")]
    IdentitiesExhausted,
}

/// Persistence surface over a single entity type.
///
/// `save` is an upsert; `delete_by_id` is a no-op for an unknown identity.
/// Business rules such as uniqueness on create or product references are
/// the caller's job.
#[async_trait]
pub trait Store<E>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<E>, StoreError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<E>, StoreError>;

    async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError>;

    async fn save(&self, entity: E) -> Result<E, StoreError>;

    async fn delete_by_id(&self, id: i32) -> Result<(), StoreError>;

    /// One past the highest identity in use, or 1 when empty. Fails with
    /// [`StoreError::IdentitiesExhausted`] once `i32::MAX` is taken.
    async fn next_id(&self) -> Result<i32, StoreError>;
}

#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn Store<Product>>,
    pub inventory: Arc<dyn Store<InventoryRecord>>,
    pub movements: Arc<dyn Store<Movement>>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(InMemoryStore::<Product>::new()),
            inventory: Arc::new(InMemoryStore::<InventoryRecord>::new()),
            movements: Arc::new(InMemoryStore::<Movement>::new()),
        }
    }

    pub fn postgres(pool: DbPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            products: store.clone(),
            inventory: store.clone(),
            movements: store,
        }
    }
}

/// Entity types that have a store in [`Stores`] and a route prefix.
pub trait Stored: Resource {
    /// Route prefix, e.g. `/product`.
    const PATH: &'static str;

    fn store(stores: &Stores) -> &dyn Store<Self>;
}

impl Stored for Product {
    const PATH: &'static str = "/product";

    fn store(stores: &Stores) -> &dyn Store<Self> {
        stores.products.as_ref()
    }
}

impl Stored for InventoryRecord {
    const PATH: &'static str = "/inventory";

    fn store(stores: &Stores) -> &dyn Store<Self> {
        stores.inventory.as_ref()
    }
}

impl Stored for Movement {
    const PATH: &'static str = "/movement";

    fn store(stores: &Stores) -> &dyn Store<Self> {
        stores.movements.as_ref()
    }
}
