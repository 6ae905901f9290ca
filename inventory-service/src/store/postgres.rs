use async_trait::async_trait;
use diesel::dsl::{exists, max};
use diesel::prelude::*;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use shared::{InventoryRecord, Movement, Product};

use super::{Store, StoreError};
use crate::models::*;
use crate::schema::*;

pub type DbPool = Pool<AsyncPgConnection>;

/// Postgres backing. Every call checks out its own pooled connection and
/// hands it back when the call returns, whatever the outcome.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

macro_rules! pg_store {
    ($entity:ty, $row:ty, $table:ident, $key:ident) => {
        #[async_trait]
        impl Store<$entity> for PgStore {
            async fn find_all(&self) -> Result<Vec<$entity>, StoreError> {
                let mut conn = self.conn().await?;
                let rows = $table::table
                    .order($table::$key.asc())
                    .load::<$row>(&mut conn)
                    .await?;
                Ok(rows.into_iter().map(Into::into).collect())
            }

            async fn find_by_id(&self, id: i32) -> Result<Option<$entity>, StoreError> {
                let mut conn = self.conn().await?;
                let row = $table::table
                    .find(id)
                    .first::<$row>(&mut conn)
                    .await
                    .optional()?;
                Ok(row.map(Into::into))
            }

            async fn exists_by_id(&self, id: i32) -> Result<bool, StoreError> {
                let mut conn = self.conn().await?;
                let found = diesel::select(exists($table::table.find(id)))
                    .get_result::<bool>(&mut conn)
                    .await?;
                Ok(found)
            }

            async fn save(&self, entity: $entity) -> Result<$entity, StoreError> {
                let mut conn = self.conn().await?;
                let row = <$row>::from(entity.clone());
                diesel::insert_into($table::table)
                    .values(&row)
                    .on_conflict($table::$key)
                    .do_update()
                    .set(&row)
                    .execute(&mut conn)
                    .await?;
                Ok(entity)
            }

            async fn delete_by_id(&self, id: i32) -> Result<(), StoreError> {
                let mut conn = self.conn().await?;
                diesel::delete($table::table.find(id))
                    .execute(&mut conn)
                    .await?;
                Ok(())
            }

            async fn next_id(&self) -> Result<i32, StoreError> {
                let mut conn = self.conn().await?;
                let highest = $table::table
                    .select(max($table::$key))
                    .first::<Option<i32>>(&mut conn)
                    .await?;
                highest
                    .unwrap_or(0)
                    .checked_add(1)
                    .ok_or(StoreError::IdentitiesExhausted)
            }
        }
    };
}

pg_store!(Product, ProductRow, products, id);
pg_store!(InventoryRecord, InventoryRow, inventory, product_id);
pg_store!(Movement, MovementRow, movements, id);
