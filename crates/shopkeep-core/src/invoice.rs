//! # Invoice Logic
//!
//! Pure pieces of the invoice-creation flow: line-item normalization and
//! total computation.
//!
//! ## Where This Sits In The Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /invoices                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize_items(drafts) ← THIS MODULE (structural checks, in order)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  per-item product lookup (shopkeep-db) - first miss aborts everything  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceTotals::compute(items, gst, discount) ← THIS MODULE            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  InvoiceRepository::insert + CustomerRepository::record_purchase       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation is sequential and fails closed: the first structural defect or
//! (later, in the handler) the first unresolvable product aborts the whole
//! creation. No partial invoice is ever produced.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_INVOICE_ITEMS;

// =============================================================================
// Line Items
// =============================================================================

/// A candidate line item as submitted by the caller.
/// Every field is optional at this stage; normalization enforces presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDraft {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub sold_price_cents: Option<i64>,
}

/// A normalized line item: exactly {product reference, display name, final
/// sold price}, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub sold_price: Money,
}

/// Normalizes a submitted item sequence.
///
/// ## Rules
/// - The sequence itself must be present and non-empty (callers pass `None`
///   when the field was absent entirely).
/// - Each item must carry a product reference, a display name and a sold
///   price; the first item missing any of them fails the whole call.
/// - Input order is preserved.
///
/// Product existence is NOT checked here - that requires the database and
/// happens in the write path, item by item, in the same order.
pub fn normalize_items(drafts: Option<&[ItemDraft]>) -> Result<Vec<LineItem>, ValidationError> {
    let drafts = match drafts {
        Some(d) if !d.is_empty() => d,
        _ => return Err(ValidationError::required("items")),
    };

    if drafts.len() > MAX_INVOICE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_INVOICE_ITEMS as i64,
        });
    }

    let mut items = Vec::with_capacity(drafts.len());
    for (idx, draft) in drafts.iter().enumerate() {
        let product_id = draft
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ValidationError::required(format!("items[{idx}].productId")))?;

        let name = draft
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ValidationError::required(format!("items[{idx}].name")))?;

        let sold_price_cents = draft
            .sold_price_cents
            .ok_or_else(|| ValidationError::required(format!("items[{idx}].finalSoldPrice")))?;

        items.push(LineItem {
            product_id: product_id.to_string(),
            name: name.to_string(),
            sold_price: Money::from_cents(sold_price_cents),
        });
    }

    Ok(items)
}

// =============================================================================
// Totals
// =============================================================================

/// Derived invoice totals.
///
/// ## Invariant
/// `grand_total == subtotal + gst_total - discount` - the grand total is
/// always derived from the freshly computed subtotal, never from any
/// caller-supplied subtotal figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of each item's final sold price.
    pub subtotal: Money,
    /// Tax amount (caller-supplied, defaults to zero).
    pub gst_total: Money,
    /// Discount amount (caller-supplied, defaults to zero).
    pub discount: Money,
    /// subtotal + gst_total - discount.
    pub grand_total: Money,
}

impl InvoiceTotals {
    /// Computes invoice totals from normalized line items.
    ///
    /// No rounding beyond integer arithmetic, and no negative-total guard:
    /// a discount larger than subtotal + tax yields a negative grand total,
    /// callers own currency-correct inputs.
    pub fn compute(items: &[LineItem], gst_total: Money, discount: Money) -> Self {
        let subtotal: Money = items.iter().map(|i| i.sold_price).sum();
        InvoiceTotals {
            subtotal,
            gst_total,
            discount,
            grand_total: subtotal + gst_total - discount,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(product_id: &str, name: &str, price: i64) -> ItemDraft {
        ItemDraft {
            product_id: Some(product_id.to_string()),
            name: Some(name.to_string()),
            sold_price_cents: Some(price),
        }
    }

    #[test]
    fn test_normalize_preserves_order() {
        let drafts = [draft("P1", "Shirt", 500), draft("P2", "Pants", 700)];
        let items = normalize_items(Some(&drafts)).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id, "P1");
        assert_eq!(items[1].product_id, "P2");
        assert_eq!(items[0].sold_price.cents(), 500);
    }

    #[test]
    fn test_missing_sequence_fails() {
        let err = normalize_items(None).unwrap_err();
        assert_eq!(err.to_string(), "items is required");
    }

    #[test]
    fn test_empty_sequence_fails() {
        let err = normalize_items(Some(&[])).unwrap_err();
        assert_eq!(err.to_string(), "items is required");
    }

    #[test]
    fn test_first_structural_defect_aborts() {
        let drafts = [
            draft("P1", "Shirt", 500),
            ItemDraft {
                product_id: Some("P2".to_string()),
                name: None,
                sold_price_cents: Some(700),
            },
            // Even worse item after the defect - never reached.
            ItemDraft::default(),
        ];
        let err = normalize_items(Some(&drafts)).unwrap_err();
        assert_eq!(err.to_string(), "items[1].name is required");
    }

    #[test]
    fn test_blank_product_id_counts_as_missing() {
        let drafts = [ItemDraft {
            product_id: Some("   ".to_string()),
            name: Some("Shirt".to_string()),
            sold_price_cents: Some(500),
        }];
        let err = normalize_items(Some(&drafts)).unwrap_err();
        assert_eq!(err.to_string(), "items[0].productId is required");
    }

    #[test]
    fn test_zero_price_is_allowed() {
        // Free/promotional units carry a zero sold price.
        let drafts = [draft("P1", "Sticker", 0)];
        let items = normalize_items(Some(&drafts)).unwrap();
        assert!(items[0].sold_price.is_zero());
    }

    #[test]
    fn test_totals_worked_example() {
        // Two items 500 + 700, gst 100, discount 50 → 1200 / 1250.
        let items = vec![
            LineItem {
                product_id: "P1".to_string(),
                name: "Shirt".to_string(),
                sold_price: Money::from_cents(500),
            },
            LineItem {
                product_id: "P2".to_string(),
                name: "Pants".to_string(),
                sold_price: Money::from_cents(700),
            },
        ];
        let totals =
            InvoiceTotals::compute(&items, Money::from_cents(100), Money::from_cents(50));
        assert_eq!(totals.subtotal.cents(), 1200);
        assert_eq!(totals.grand_total.cents(), 1250);
    }

    #[test]
    fn test_totals_defaults() {
        let items = vec![LineItem {
            product_id: "P1".to_string(),
            name: "Shirt".to_string(),
            sold_price: Money::from_cents(500),
        }];
        let totals = InvoiceTotals::compute(&items, Money::zero(), Money::zero());
        assert_eq!(totals.subtotal, totals.grand_total);
    }

    #[test]
    fn test_totals_invariant_holds() {
        let items = vec![
            LineItem {
                product_id: "a".into(),
                name: "A".into(),
                sold_price: Money::from_cents(333),
            },
            LineItem {
                product_id: "b".into(),
                name: "B".into(),
                sold_price: Money::from_cents(667),
            },
        ];
        let totals =
            InvoiceTotals::compute(&items, Money::from_cents(90), Money::from_cents(140));
        assert_eq!(
            totals.grand_total,
            totals.subtotal + totals.gst_total - totals.discount
        );
    }

    #[test]
    fn test_no_negative_total_guard() {
        let items = vec![LineItem {
            product_id: "P1".into(),
            name: "Shirt".into(),
            sold_price: Money::from_cents(100),
        }];
        let totals =
            InvoiceTotals::compute(&items, Money::zero(), Money::from_cents(500));
        assert_eq!(totals.grand_total.cents(), -400);
    }
}
