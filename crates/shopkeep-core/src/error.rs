//! # Error Types
//!
//! Domain-specific error types for shopkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopkeep-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopkeep-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  API errors (in apps/api)                                              │
//! │  └── ApiError         - HTTP status + {success:false, error} body      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (the missing product id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line item references a product that doesn't exist.
    ///
    /// The message carries the offending id so a 400 response can identify
    /// which item broke the creation. The first missing product aborts the
    /// whole invoice - nothing partial is persisted.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The referenced customer doesn't exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Invoice is not in a state that allows the requested operation.
    #[error("Invoice {invoice_id} is {current_status}, cannot perform operation")]
    InvalidInvoiceStatus {
        invoice_id: String,
        current_status: String,
    },

    /// Invoice has exceeded the maximum allowed line items.
    #[error("Invoice cannot have more than {max} items")]
    TooManyItems { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when request input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
