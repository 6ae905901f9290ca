use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{FieldSet, Payload, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ProductRequest {
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0, message = "the price must be greater than zero"))]
    pub price: f64,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub description: Option<String>,
}

impl Default for ProductRequest {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            price: 10.0,
            description: None,
        }
    }
}

impl Payload for ProductRequest {
    const IDENTITY: &'static str = "id";
}

impl Resource for Product {
    type Request = ProductRequest;

    const NAME: &'static str = "Product";

    fn id(&self) -> i32 {
        self.id
    }

    fn requested_id(request: &ProductRequest) -> Option<i32> {
        request.id
    }

    fn from_request(id: i32, request: ProductRequest) -> Self {
        Self {
            id,
            name: request.name,
            price: request.price,
            description: request.description,
        }
    }

    fn merge(&self, request: ProductRequest, fields: &FieldSet) -> Self {
        Self {
            id: self.id,
            name: fields.pick("name", request.name, &self.name),
            price: fields.pick("price", request.price, &self.price),
            description: fields.pick("description", request.description, &self.description),
        }
    }
}
