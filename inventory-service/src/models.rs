use diesel::prelude::*;
use shared::{InventoryRecord, Movement, Product};

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(primary_key(id))]
#[diesel(treat_none_as_null = true)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::inventory)]
#[diesel(primary_key(product_id))]
pub struct InventoryRow {
    pub product_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::movements)]
#[diesel(primary_key(id))]
pub struct MovementRow {
    pub id: i32,
    pub product_id: i32,
    pub quantity_change: i32,
}

impl From<Product> for ProductRow {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            description: product.description,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description,
        }
    }
}

impl From<InventoryRecord> for InventoryRow {
    fn from(record: InventoryRecord) -> Self {
        Self {
            product_id: record.product_id,
            quantity: record.quantity,
        }
    }
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        Self {
            product_id: row.product_id,
            quantity: row.quantity,
        }
    }
}

impl From<Movement> for MovementRow {
    fn from(movement: Movement) -> Self {
        Self {
            id: movement.id,
            product_id: movement.product_id,
            quantity_change: movement.quantity_change,
        }
    }
}

impl From<MovementRow> for Movement {
    fn from(row: MovementRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            quantity_change: row.quantity_change,
        }
    }
}
