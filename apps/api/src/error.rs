//! API error type and its HTTP mapping.
//!
//! ## Status Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ValidationError, missing customer/product on create  →  400            │
//! │  missing invoice (or other entity) on GET/PUT/DELETE  →  404            │
//! │  unique-constraint collision (sku, invoice number)    →  409            │
//! │  storage / unexpected                                 →  500            │
//! │                                                                         │
//! │  500 bodies carry a generic message; the detail goes to the server      │
//! │  log via tracing, never to the client.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error body is the failure envelope: `{ "success": false, "error": msg }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use shopkeep_core::{CoreError, ValidationError};
use shopkeep_db::DbError;

/// API errors, one variant per HTTP status class the server emits.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or rejected input, including references to entities that
    /// must exist at creation time (customer, products).
    #[error("{0}")]
    BadRequest(String),

    /// The addressed resource doesn't exist.
    #[error("{0}")]
    NotFound(String),

    /// A unique constraint collision (duplicate SKU, invoice number).
    #[error("{0}")]
    Conflict(String),

    /// Anything unexpected. The client sees a generic message; the detail
    /// was already logged where the error was converted.
    #[error("Internal server error")]
    Internal,
}

/// Convenience alias for handler results.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            // Creation-time reference checks: the request is at fault.
            CoreError::ProductNotFound(_)
            | CoreError::CustomerNotFound(_)
            | CoreError::TooManyItems { .. }
            | CoreError::InvalidInvoiceStatus { .. } => ApiError::BadRequest(err.to_string()),
            CoreError::InvoiceNotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::Validation(v) => v.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} not found: {id}"))
            }
            DbError::UniqueViolation { field, value } => {
                ApiError::Conflict(format!("Duplicate {field}: {value}"))
            }
            other => {
                tracing::error!(error = %other, "Storage error");
                ApiError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let err: ApiError = ValidationError::required("customer").into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "customer is required");
    }

    #[test]
    fn test_missing_product_on_create_is_400_naming_the_id() {
        let err: ApiError = CoreError::ProductNotFound("P9".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("P9"));
    }

    #[test]
    fn test_db_not_found_maps_to_404() {
        let err: ApiError = DbError::not_found("Invoice", "abc").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_body_is_generic() {
        let err: ApiError = DbError::ConnectionFailed("pool gone".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }
}
