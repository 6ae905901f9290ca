use shared::{Payload, Product, Resource, Submitted};
use std::marker::PhantomData;
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::store::{Store, StoreError, Stored, Stores};

pub type Result<T> = std::result::Result<T, ServiceError>;

/// CRUD orchestration for one record kind.
///
/// Owns the existence, conflict and product-reference checks; the store
/// underneath only persists.
pub struct ResourceService<E> {
    stores: Stores,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Stored> ResourceService<E> {
    pub fn new(stores: Stores) -> Self {
        Self {
            stores,
            _entity: PhantomData,
        }
    }

    fn store(&self) -> &dyn Store<E> {
        E::store(&self.stores)
    }

    pub async fn list(&self) -> Result<Vec<E>> {
        Ok(self.store().find_all().await?)
    }

    pub async fn get(&self, id: i32) -> Result<E> {
        self.store()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(E::NAME, id))
    }

    pub async fn create(&self, submitted: Submitted<E::Request>) -> Result<E> {
        let id = match E::requested_id(&submitted.value) {
            Some(id) => {
                if self.store().exists_by_id(id).await? {
                    return Err(ServiceError::Conflict(format!(
                        "{} {} already exists",
                        E::NAME,
                        id
                    )));
                }
                id
            }
            None => self.store().next_id().await.map_err(|e| match e {
                StoreError::IdentitiesExhausted => ServiceError::Conflict(format!(
                    "no {} identity left to assign",
                    E::NAME
                )),
                other => other.into(),
            })?,
        };

        let entity = E::from_request(id, submitted.value);
        self.check_product_ref(&entity).await?;

        let saved = self.store().save(entity).await?;
        info!("Created {} {}", E::NAME, id);
        Ok(saved)
    }

    /// Full replace. Fields the caller left out fall back to their defaults.
    pub async fn replace(&self, id: i32, submitted: Submitted<E::Request>) -> Result<E> {
        self.ensure_exists(id).await?;
        check_identity::<E>(id, &submitted)?;

        let entity = E::from_request(id, submitted.value);
        self.check_product_ref(&entity).await?;

        let saved = self.store().save(entity).await?;
        info!("Replaced {} {}", E::NAME, id);
        Ok(saved)
    }

    /// Partial update. Only supplied fields overwrite the stored record.
    pub async fn patch(&self, id: i32, submitted: Submitted<E::Request>) -> Result<E> {
        let stored = self.get(id).await?;
        check_identity::<E>(id, &submitted)?;
        let merged = stored.merge(submitted.value, &submitted.fields);

        if merged == stored {
            debug!("Patch left {} {} unchanged", E::NAME, id);
            return Ok(stored);
        }
        if merged.product_ref() != stored.product_ref() {
            self.check_product_ref(&merged).await?;
        }

        let saved = self.store().save(merged).await?;
        info!(
            "Patched {} {} ({})",
            E::NAME,
            id,
            submitted.fields.iter().collect::<Vec<_>>().join(", ")
        );
        Ok(saved)
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        self.ensure_exists(id).await?;
        self.store().delete_by_id(id).await?;
        info!("Removed {} {}", E::NAME, id);
        Ok(())
    }

    async fn ensure_exists(&self, id: i32) -> Result<()> {
        if self.store().exists_by_id(id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(E::NAME, id))
        }
    }

    async fn check_product_ref(&self, entity: &E) -> Result<()> {
        let Some(product_id) = entity.product_ref() else {
            return Ok(());
        };
        if self.stores.products.exists_by_id(product_id).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(Product::NAME, product_id))
        }
    }
}

/// A body may repeat the path identity but never name a different one.
fn check_identity<E: Resource>(id: i32, submitted: &Submitted<E::Request>) -> Result<()> {
    let key = <E::Request as Payload>::IDENTITY;
    if submitted.fields.contains(key) && E::requested_id(&submitted.value) != Some(id) {
        return Err(ServiceError::Invalid(format!(
            "{key} in body does not match {} {id}",
            E::NAME
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::schema::{parse, Mode};
    use shared::{InventoryRecord, Movement};

    fn full<E: Stored>(body: serde_json::Value) -> Submitted<E::Request> {
        parse(body, Mode::Create).unwrap()
    }

    fn replacement<E: Stored>(body: serde_json::Value) -> Submitted<E::Request> {
        parse(body, Mode::Replace).unwrap()
    }

    fn partial<E: Stored>(body: serde_json::Value) -> Submitted<E::Request> {
        parse(body, Mode::Partial).unwrap()
    }

    async fn with_console(stores: &Stores) -> Product {
        ResourceService::<Product>::new(stores.clone())
            .create(full::<Product>(json!({
                "name": "PS5",
                "price": 5250.0,
                "description": "console"
            })))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips_with_defaults() {
        let stores = Stores::in_memory();
        let products = ResourceService::<Product>::new(stores.clone());

        let created = products
            .create(full::<Product>(json!({"name": "Keyboard"})))
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.price, 10.0);
        assert_eq!(products.get(1).await.unwrap(), created);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_identity() {
        let stores = Stores::in_memory();
        let products = ResourceService::<Product>::new(stores.clone());
        products
            .create(full::<Product>(json!({"id": 4, "name": "Mouse"})))
            .await
            .unwrap();

        let err = products
            .create(full::<Product>(json!({"id": 4, "name": "Other"})))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(products.get(4).await.unwrap().name, "Mouse");
    }

    #[tokio::test]
    async fn create_conflicts_once_identities_run_out() {
        let products = ResourceService::<Product>::new(Stores::in_memory());
        products
            .create(full::<Product>(json!({"id": i32::MAX, "name": "Max"})))
            .await
            .unwrap();

        let err = products
            .create(full::<Product>(json!({"name": "Next"})))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(products.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn inventory_replace_takes_product_from_path() {
        let stores = Stores::in_memory();
        with_console(&stores).await;
        let inventory = ResourceService::<InventoryRecord>::new(stores);
        inventory
            .create(full::<InventoryRecord>(json!({"product_id": 1, "quantity": 5})))
            .await
            .unwrap();

        let replaced = inventory
            .replace(1, replacement::<InventoryRecord>(json!({"quantity": 7})))
            .await
            .unwrap();
        assert_eq!(replaced, InventoryRecord { product_id: 1, quantity: 7 });

        let replaced = inventory
            .replace(
                1,
                replacement::<InventoryRecord>(json!({"product_id": 1, "quantity": 8})),
            )
            .await
            .unwrap();
        assert_eq!(replaced.quantity, 8);

        let err = inventory
            .replace(
                1,
                replacement::<InventoryRecord>(json!({"product_id": 99, "quantity": 9})),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert_eq!(inventory.get(1).await.unwrap().quantity, 8);
    }

    #[tokio::test]
    async fn patch_rejects_a_different_body_identity() {
        let stores = Stores::in_memory();
        let console = with_console(&stores).await;
        let products = ResourceService::<Product>::new(stores);

        for id in [0, 2] {
            let err = products
                .patch(console.id, partial::<Product>(json!({"id": id, "price": 1.0})))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Invalid(_)));
        }
        assert_eq!(products.get(console.id).await.unwrap(), console);

        let patched = products
            .patch(console.id, partial::<Product>(json!({"id": 1, "price": 1.0})))
            .await
            .unwrap();
        assert_eq!(patched.price, 1.0);
    }

    #[tokio::test]
    async fn patch_only_touches_supplied_fields() {
        let stores = Stores::in_memory();
        let console = with_console(&stores).await;
        let products = ResourceService::<Product>::new(stores);

        let patched = products
            .patch(console.id, partial::<Product>(json!({"price": 5300.0})))
            .await
            .unwrap();

        assert_eq!(patched.name, "PS5");
        assert_eq!(patched.price, 5300.0);
        assert_eq!(patched.description.as_deref(), Some("console"));
    }

    #[tokio::test]
    async fn empty_patch_leaves_record_unchanged() {
        let stores = Stores::in_memory();
        let console = with_console(&stores).await;
        let products = ResourceService::<Product>::new(stores);

        let patched = products
            .patch(console.id, partial::<Product>(json!({})))
            .await
            .unwrap();

        assert_eq!(patched, console);
        assert_eq!(products.get(console.id).await.unwrap(), console);
    }

    #[tokio::test]
    async fn replace_resets_omitted_fields_to_defaults() {
        let stores = Stores::in_memory();
        let console = with_console(&stores).await;
        let products = ResourceService::<Product>::new(stores);

        let replaced = products
            .replace(console.id, replacement::<Product>(json!({"name": "PS5"})))
            .await
            .unwrap();

        assert_eq!(replaced.description, None);
        assert_eq!(replaced.price, 10.0);
    }

    #[tokio::test]
    async fn update_patch_and_delete_require_existing_record() {
        let products = ResourceService::<Product>::new(Stores::in_memory());

        assert!(matches!(
            products.replace(3, replacement::<Product>(json!({"name": "x"}))).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            products.patch(3, partial::<Product>(json!({}))).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(products.delete(3).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_terminal() {
        let stores = Stores::in_memory();
        let console = with_console(&stores).await;
        let products = ResourceService::<Product>::new(stores);

        products.delete(console.id).await.unwrap();

        assert!(matches!(products.get(console.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(products.delete(console.id).await, Err(ServiceError::NotFound(_))));
        assert!(products.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn inventory_requires_existing_product() {
        let stores = Stores::in_memory();
        let inventory = ResourceService::<InventoryRecord>::new(stores.clone());

        let err = inventory
            .create(full::<InventoryRecord>(json!({"product_id": 1, "quantity": 5})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Product 1 not found"));

        with_console(&stores).await;
        let record = inventory
            .create(full::<InventoryRecord>(json!({"product_id": 1, "quantity": 5})))
            .await
            .unwrap();
        assert_eq!(record.quantity, 5);

        let err = inventory
            .create(full::<InventoryRecord>(json!({"product_id": 1, "quantity": 9})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn movement_patch_rechecks_changed_product_reference() {
        let stores = Stores::in_memory();
        with_console(&stores).await;
        let movements = ResourceService::<Movement>::new(stores.clone());

        let movement = movements
            .create(full::<Movement>(json!({"product_id": 1, "quantity_change": -2})))
            .await
            .unwrap();

        let err = movements
            .patch(movement.id, partial::<Movement>(json!({"product_id": 99})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let patched = movements
            .patch(movement.id, partial::<Movement>(json!({"quantity_change": 3})))
            .await
            .unwrap();
        assert_eq!(patched.quantity_change, 3);
        assert_eq!(patched.product_id, 1);
    }

    #[tokio::test]
    async fn list_holds_each_live_record_once() {
        let stores = Stores::in_memory();
        let products = ResourceService::<Product>::new(stores);
        for name in ["a", "b", "c"] {
            products
                .create(full::<Product>(json!({"name": name})))
                .await
                .unwrap();
        }
        products
            .patch(2, partial::<Product>(json!({"name": "bb"})))
            .await
            .unwrap();
        products.delete(1).await.unwrap();

        let names: Vec<_> = products
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["bb", "c"]);
    }
}
