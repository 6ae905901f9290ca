use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{FieldSet, Payload, ProductId, Resource};

/// A signed stock change recorded against a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: i32,
    pub product_id: ProductId,
    pub quantity_change: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct MovementRequest {
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub id: Option<i32>,
    #[validate(range(min = 1, message = "must reference a product identity"))]
    pub product_id: ProductId,
    pub quantity_change: i32,
}

impl Payload for MovementRequest {
    const IDENTITY: &'static str = "id";
}

impl Resource for Movement {
    type Request = MovementRequest;

    const NAME: &'static str = "Movement";

    fn id(&self) -> i32 {
        self.id
    }

    fn requested_id(request: &MovementRequest) -> Option<i32> {
        request.id
    }

    fn from_request(id: i32, request: MovementRequest) -> Self {
        Self {
            id,
            product_id: request.product_id,
            quantity_change: request.quantity_change,
        }
    }

    fn merge(&self, request: MovementRequest, fields: &FieldSet) -> Self {
        Self {
            id: self.id,
            product_id: fields.pick("product_id", request.product_id, &self.product_id),
            quantity_change: fields.pick(
                "quantity_change",
                request.quantity_change,
                &self.quantity_change,
            ),
        }
    }

    fn product_ref(&self) -> Option<ProductId> {
        Some(self.product_id)
    }
}
