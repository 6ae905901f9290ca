use shared::schema::{FieldSet, Submitted};
use shared::{InventoryRecord, InventoryRequest, Product, ProductRequest};
use tracing::info;

use crate::error::ServiceError;
use crate::service::ResourceService;
use crate::store::Stores;

const DEMO_PRODUCTS: [(i32, &str, f64, &str, i32); 3] = [
    (1, "PS5", 5250.0, "White gaming console", 20),
    (2, "XBOX Series X", 4699.99, "Black gaming console", 15),
    (3, "HDMI1 Cable", 79.99, "Accessory", 50),
];

fn submitted<T>(value: T, fields: &[&str]) -> Submitted<T> {
    Submitted {
        value,
        fields: fields.iter().copied().collect::<FieldSet>(),
    }
}

/// Loads the demo catalogue. Records that already exist are left alone.
pub async fn seed_demo_data(stores: &Stores) -> Result<(), ServiceError> {
    let products = ResourceService::<Product>::new(stores.clone());
    let inventory = ResourceService::<InventoryRecord>::new(stores.clone());
    let mut created = 0;

    for (id, name, price, description, quantity) in DEMO_PRODUCTS {
        let product = ProductRequest {
            id: Some(id),
            name: name.to_string(),
            price,
            description: Some(description.to_string()),
        };
        match products
            .create(submitted(product, &["id", "name", "price", "description"]))
            .await
        {
            Ok(_) => created += 1,
            Err(ServiceError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }

        let stock = InventoryRequest {
            product_id: id,
            quantity,
        };
        match inventory
            .create(submitted(stock, &["product_id", "quantity"]))
            .await
        {
            Ok(_) | Err(ServiceError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
    }

    info!("Seeded {} demo products", created);
    Ok(())
}
