use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{FieldSet, Payload, ProductId, Resource};

/// Stock level of a single product. Keyed by the product's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct InventoryRequest {
    #[validate(range(min = 1, message = "must reference a product identity"))]
    pub product_id: ProductId,
    #[validate(range(min = 0, message = "the quantity must be greater than or equal to zero"))]
    pub quantity: i32,
}

impl Payload for InventoryRequest {
    const IDENTITY: &'static str = "product_id";
}

impl Resource for InventoryRecord {
    type Request = InventoryRequest;

    const NAME: &'static str = "Inventory";

    fn id(&self) -> i32 {
        self.product_id
    }

    fn requested_id(request: &InventoryRequest) -> Option<i32> {
        Some(request.product_id)
    }

    fn from_request(id: i32, request: InventoryRequest) -> Self {
        Self {
            product_id: id,
            quantity: request.quantity,
        }
    }

    // The product_id is the identity, so only the quantity can move.
    fn merge(&self, request: InventoryRequest, fields: &FieldSet) -> Self {
        Self {
            product_id: self.product_id,
            quantity: fields.pick("quantity", request.quantity, &self.quantity),
        }
    }

    fn product_ref(&self) -> Option<ProductId> {
        Some(self.product_id)
    }
}
