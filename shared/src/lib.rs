use serde::Serialize;

pub mod inventory;
pub mod movement;
pub mod product;
pub mod schema;

pub use inventory::{InventoryRecord, InventoryRequest};
pub use movement::{Movement, MovementRequest};
pub use product::{Product, ProductRequest};
pub use schema::{FieldSet, Mode, Payload, SchemaError, Submitted};

pub type ProductId = i32;

/// A stored record kind addressed by a positive integer identity.
pub trait Resource: Clone + PartialEq + Serialize + Send + Sync + 'static {
    /// Request body accepted on create, replace and merge.
    type Request: Payload + Send + 'static;

    /// Human readable name used in error details and logs.
    const NAME: &'static str;

    fn id(&self) -> i32;

    /// Identity carried by a payload, if the caller chose one.
    fn requested_id(request: &Self::Request) -> Option<i32>;

    /// Builds a record from a full payload. Omitted fields already hold
    /// their declared defaults.
    fn from_request(id: i32, request: Self::Request) -> Self;

    /// Overlays the supplied fields of `request` onto `self`.
    fn merge(&self, request: Self::Request, fields: &FieldSet) -> Self;

    /// Product this record depends on.
    fn product_ref(&self) -> Option<ProductId> {
        None
    }
}
