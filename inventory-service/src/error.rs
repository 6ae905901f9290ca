use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use shared::SchemaError;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(kind: &str, id: i32) -> Self {
        Self::NotFound(format!("{kind} {id} not found"))
    }
}

/// Everything a handler can fail with, mapped onto a status code and a
/// `{"detail": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    Schema(SchemaError),
    Body(JsonRejection),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Service(ServiceError::NotFound(detail)) => (StatusCode::NOT_FOUND, detail),
            ApiError::Service(ServiceError::Conflict(detail)) => (StatusCode::CONFLICT, detail),
            ApiError::Service(ServiceError::Invalid(detail)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, detail)
            }
            ApiError::Service(ServiceError::Storage(e)) => {
                error!("Storage failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Storage failure: {}", e),
                )
            }
            ApiError::Schema(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Body(rejection) => (rejection.status(), rejection.body_text()),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
