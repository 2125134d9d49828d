//! # Validation Module
//!
//! Input validation utilities for Shopkeep.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP deserialization (serde)                                 │
//! │  ├── Type validation (numbers are numbers, etc.)                       │
//! │  └── Malformed JSON rejected before a handler runs                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Required fields, lengths, ranges                                  │
//! │  └── Field-identifying error messages for 400 responses                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (invoice_number, sku, attendance day)          │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (customer, product, staff).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
///
/// ## Returns
/// The trimmed name.
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(name.to_string())
}

/// Validates a SKU (business identifier).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a listed price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates pagination parameters, returning `(page, limit)` with defaults
/// applied.
///
/// ## Rules
/// - `page` defaults to 1, must be >= 1
/// - `limit` defaults to 10, must be 1..=100
pub fn validate_pagination(
    page: Option<i64>,
    limit: Option<i64>,
) -> ValidationResult<(i64, i64)> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(10);

    if page < 1 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    if !(1..=100).contains(&limit) {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: 100,
        });
    }

    Ok((page, limit))
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use shopkeep_core::validation::validate_uuid;
///
/// assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
