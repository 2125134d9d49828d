//! # shopkeep-core: Pure Business Logic for Shopkeep
//!
//! This crate is the **heart** of Shopkeep. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopkeep Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP Clients (dashboard, POS)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (Axum handlers)                     │   │
//! │  │    POST /invoices, GET /products, POST /customers, etc.         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopkeep-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  invoice  │  │ validation│  │   │
//! │  │   │  Customer │  │   Money   │  │  LineItem │  │   rules   │  │   │
//! │  │   │  Invoice  │  │  (cents)  │  │  Totals   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shopkeep-db (Database Layer)                 │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Product, Invoice, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`invoice`] - Line-item normalization and invoice total math
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod invoice;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shopkeep_core::Money` instead of
// `use shopkeep_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use invoice::{InvoiceTotals, ItemDraft, LineItem};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID for v0.1 (single-tenant runtime with multi-tenant schema)
///
/// ## Why a constant?
/// v0.1 serves a single shop, but the database schema includes tenant_id so
/// that hosted multi-shop deployments don't need a schema rewrite. This
/// constant is used throughout the codebase and will be replaced with
/// dynamic tenant resolution when that lands.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum line items allowed on a single invoice
///
/// ## Business Reason
/// Prevents runaway payloads and keeps invoices printable.
pub const MAX_INVOICE_ITEMS: usize = 200;

/// Maximum products created by one bulk-generation request
pub const MAX_BULK_PRODUCTS: usize = 500;
