//! # Domain Types
//!
//! Core domain types used throughout Shopkeep.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Invoice     │   │    Product      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  total_purchases│   │  invoice_number │   │  sku (business) │       │
//! │  │  last_purchase  │   │  totals, status │   │  price_cents    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InvoiceItem    │   │     Staff       │   │  Attendance     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name_snapshot  │   │  id, name, role │   │  (staff, date)  │       │
//! │  │  sold_price     │   │                 │   │  status, times  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (invoice_number, sku) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer of the shop.
///
/// Carries the running purchase aggregates maintained by the invoice write
/// path: `total_purchases_cents` is incremented by each new invoice's grand
/// total and `last_purchase_date` set to its creation time. Cancelling an
/// invoice does not reverse them - the aggregate reads as lifetime gross.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this customer belongs to.
    pub tenant_id: String,

    /// Display name.
    pub name: String,

    /// Contact phone number.
    pub phone: Option<String>,

    /// Contact email address.
    pub email: Option<String>,

    /// Postal address.
    pub address: Option<String>,

    /// Lifetime gross purchases in cents.
    pub total_purchases_cents: i64,

    /// When the customer last purchased (invoice creation time).
    pub last_purchase_date: Option<DateTime<Utc>>,

    /// Whether the customer is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the lifetime purchase aggregate as Money.
    #[inline]
    pub fn total_purchases(&self) -> Money {
        Money::from_cents(self.total_purchases_cents)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Each product row is a unique, one-off unit rather than a quantity-tracked
/// SKU - there is no stock counter and no availability check at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Business identifier, unique per tenant.
    pub sku: String,

    /// Display name shown in the catalog and on invoices.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Optional category for catalog filtering.
    pub category: Option<String>,

    /// Listed price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the listed price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Staff
// =============================================================================

/// A staff member. Referenced by invoices via `sold_by` and by attendance
/// records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub phone: Option<String>,
    /// Free-form role label ("manager", "cashier", ...).
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Attendance
// =============================================================================

/// Attendance status for one staff member on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        AttendanceStatus::Present
    }
}

/// One staff member's attendance record for one date.
/// Keyed on `(staff_id, date)` - writes for the same day upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AttendanceRecord {
    pub id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Purchase Status
// =============================================================================

/// Lifecycle status of an invoice's purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Goods reserved, purchase not finalized.
    Pending,
    /// Purchase went through.
    Completed,
    /// Soft-deleted. Record stays retrievable, never physically removed.
    Cancelled,
}

impl Default for PurchaseStatus {
    fn default() -> Self {
        PurchaseStatus::Completed
    }
}

// =============================================================================
// Payment Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting payment.
    Pending,
    /// Fully paid. Transition into this state stamps `paid_at`.
    Paid,
    /// Payment failed or invoice cancelled.
    Failed,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Online transfer / wallet.
    Online,
}

// =============================================================================
// Invoice
// =============================================================================

/// A persisted invoice.
///
/// Created once via the write path; afterwards only the restricted field set
/// (statuses, payment method, notes, due date, paid-at) may change.
/// "Deletion" is a soft transition to `PurchaseStatus::Cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,
    pub tenant_id: String,
    /// Human-readable business identifier, unique, immutable.
    pub invoice_number: String,
    pub customer_id: String,
    /// Pre-tax/discount subtotal: sum of each item's sold price.
    pub subtotal_cents: i64,
    /// Tax amount, caller-supplied or defaulted to 0.
    pub gst_total_cents: i64,
    /// Discount amount, caller-supplied or defaulted to 0.
    pub discount_cents: i64,
    /// subtotal + tax - discount.
    pub total_cents: i64,
    pub purchase_status: PurchaseStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// Staff member who made the sale.
    pub sold_by: String,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// Stamped automatically on transition into `PaymentStatus::Paid`.
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Invoice Item
// =============================================================================

/// A line item on an invoice.
/// Uses snapshot pattern to freeze the display name at time of sale; the
/// reader projection prefers the live product's fields when it still exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub product_id: String,
    /// Display name at time of sale (frozen).
    pub name_snapshot: String,
    /// Price the unit was actually sold at, in cents.
    pub sold_price_cents: i64,
    /// Zero-based input order, preserved for the projection.
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

impl InvoiceItem {
    /// Returns the sold price as Money.
    #[inline]
    pub fn sold_price(&self) -> Money {
        Money::from_cents(self.sold_price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
