//! Invoice routes: the creation/totals write path and its read projections.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /invoices                                                         │
//! │                                                                         │
//! │  1. required fields: customer, items, paymentMethod, soldBy    → 400    │
//! │  2. normalize items (structural, in order)                     → 400    │
//! │  3. customer lookup                                            → 400    │
//! │  4. per-item product lookup, in order; first miss aborts       → 400    │
//! │     ("Product not found: <id>") - NOTHING persisted so far              │
//! │  5. totals: subtotal = Σ soldPrice; grand = subtotal + gst − discount  │
//! │     (always from the computed subtotal, never caller-supplied)          │
//! │  6. invoice + items persisted in one transaction                        │
//! │  7. separate write: customer aggregate += grand, lastPurchase = now    │
//! │  8. 201 with the flattened projection                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Projections
//! List and create responses flatten each line item to the referenced
//! product's fields plus `finalSoldPrice`; the product's live name supersedes
//! the cached snapshot, and items whose product no longer resolves are
//! silently dropped. `GET /invoices/{id}` returns the expanded shape with
//! the snapshot intact and the product attached when it still exists.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use shopkeep_core::invoice::{normalize_items, InvoiceTotals, ItemDraft, LineItem};
use shopkeep_core::validation::validate_pagination;
use shopkeep_core::{
    CoreError, Invoice, InvoiceItem, Money, PaymentMethod, PaymentStatus, PurchaseStatus,
    ValidationError, DEFAULT_TENANT_ID,
};
use shopkeep_db::{generate_invoice_number, Database, InvoiceFilter, InvoiceUpdate};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::response::{ApiResponse, ListResponse, Pagination};
use crate::state::AppState;

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateInvoiceBody {
    /// Customer id the invoice is written against.
    pub customer: Option<String>,
    pub items: Option<Vec<ItemBody>>,
    pub gst_total_amount: Option<i64>,
    pub total_discount: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub sold_by: Option<String>,
    pub purchase_status: Option<PurchaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// A submitted line item. Presence is enforced by `normalize_items`, not
/// by serde, so a missing field produces a field-naming 400 instead of a
/// deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemBody {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub final_sold_price: Option<i64>,
}

impl From<ItemBody> for ItemDraft {
    fn from(body: ItemBody) -> Self {
        ItemDraft {
            product_id: body.product_id,
            name: body.name,
            sold_price_cents: body.final_sold_price,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateInvoiceBody {
    /// Purchase status ("status" on the wire, matching the stored field's
    /// client-facing name).
    #[serde(rename = "status")]
    pub purchase_status: Option<PurchaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub purchase_status: Option<PurchaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: Option<String>,
}

// =============================================================================
// Response Shapes
// =============================================================================

/// The flattened list/create projection of an invoice.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    pub id: String,
    pub invoice_number: String,
    pub customer: String,
    pub items: Vec<FlatItemView>,
    /// Pre-tax/discount subtotal. The wire name preserves a long-standing
    /// client-facing typo; renaming it would break existing consumers.
    #[serde(rename = "intialTotalPrice")]
    pub initial_total_price: i64,
    pub gst_total_amount: i64,
    pub total_discount: i64,
    pub total_final_price: i64,
    pub purchase_status: PurchaseStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub sold_by: String,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item flattened to its product's fields plus the sale price.
/// No separate `name` snapshot: the product's own name supersedes it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatItemView {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: i64,
    pub final_sold_price: i64,
}

/// The expanded shape returned by `GET /invoices/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailView {
    pub id: String,
    pub invoice_number: String,
    pub customer: String,
    pub items: Vec<DetailItemView>,
    #[serde(rename = "intialTotalPrice")]
    pub initial_total_price: i64,
    pub gst_total_amount: i64,
    pub total_discount: i64,
    pub total_final_price: i64,
    pub purchase_status: PurchaseStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub sold_by: String,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An expanded line item: the frozen sale-time snapshot, with the live
/// product attached when it still resolves.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailItemView {
    pub product_id: String,
    pub name: String,
    pub final_sold_price: i64,
    pub product: Option<super::product::ProductView>,
}

impl InvoiceView {
    fn from_parts(invoice: &Invoice, items: Vec<FlatItemView>) -> Self {
        InvoiceView {
            id: invoice.id.clone(),
            invoice_number: invoice.invoice_number.clone(),
            customer: invoice.customer_id.clone(),
            items,
            initial_total_price: invoice.subtotal_cents,
            gst_total_amount: invoice.gst_total_cents,
            total_discount: invoice.discount_cents,
            total_final_price: invoice.total_cents,
            purchase_status: invoice.purchase_status,
            payment_status: invoice.payment_status,
            payment_method: invoice.payment_method,
            sold_by: invoice.sold_by.clone(),
            notes: invoice.notes.clone(),
            due_date: invoice.due_date,
            paid_at: invoice.paid_at,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

impl InvoiceDetailView {
    fn from_parts(invoice: &Invoice, items: Vec<DetailItemView>) -> Self {
        InvoiceDetailView {
            id: invoice.id.clone(),
            invoice_number: invoice.invoice_number.clone(),
            customer: invoice.customer_id.clone(),
            items,
            initial_total_price: invoice.subtotal_cents,
            gst_total_amount: invoice.gst_total_cents,
            total_discount: invoice.discount_cents,
            total_final_price: invoice.total_cents,
            purchase_status: invoice.purchase_status,
            payment_status: invoice.payment_status,
            payment_method: invoice.payment_method,
            sold_by: invoice.sold_by.clone(),
            notes: invoice.notes.clone(),
            due_date: invoice.due_date,
            paid_at: invoice.paid_at,
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

// =============================================================================
// Projection Helpers
// =============================================================================

/// Builds the flattened projection. Items whose product no longer resolves
/// (deleted, or soft-deleted) are dropped without error.
async fn project_flat(db: &Database, invoice: &Invoice) -> ApiResult<InvoiceView> {
    let items = db.invoices().get_items(&invoice.id).await?;

    let mut projected = Vec::with_capacity(items.len());
    for item in items {
        match db.products().get_by_id(&item.product_id).await? {
            Some(product) if product.is_active => projected.push(FlatItemView {
                id: product.id,
                sku: product.sku,
                name: product.name,
                description: product.description,
                category: product.category,
                price: product.price_cents,
                final_sold_price: item.sold_price_cents,
            }),
            _ => {}
        }
    }

    Ok(InvoiceView::from_parts(invoice, projected))
}

/// Builds the expanded detail shape. The sale-time snapshot is always kept;
/// the product is attached whenever its row still exists (even soft-deleted,
/// so the client can label it).
async fn project_detail(db: &Database, invoice: &Invoice) -> ApiResult<InvoiceDetailView> {
    let items = db.invoices().get_items(&invoice.id).await?;

    let mut expanded = Vec::with_capacity(items.len());
    for item in items {
        let product = db.products().get_by_id(&item.product_id).await?;
        expanded.push(DetailItemView {
            product_id: item.product_id,
            name: item.name_snapshot,
            final_sold_price: item.sold_price_cents,
            product: product.map(super::product::ProductView::from),
        });
    }

    Ok(InvoiceDetailView::from_parts(invoice, expanded))
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /invoices`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateInvoiceBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<InvoiceView>>)> {
    // Required scalars first; every failure here leaves nothing persisted.
    let customer_id = body
        .customer
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ValidationError::required("customer"))?
        .to_string();

    let payment_method = body
        .payment_method
        .ok_or_else(|| ValidationError::required("paymentMethod"))?;

    let sold_by = body
        .sold_by
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ValidationError::required("soldBy"))?
        .to_string();

    let drafts: Option<Vec<ItemDraft>> = body
        .items
        .map(|items| items.into_iter().map(ItemDraft::from).collect());
    let line_items = normalize_items(drafts.as_deref())?;

    // Reference checks, still before any write. Soft-deleted rows count as
    // gone: an invoice can only be written against a live customer and live
    // products (the flattened projection would otherwise hide the item
    // while its price stays in the totals).
    match state.db.customers().get_by_id(&customer_id).await? {
        Some(customer) if customer.is_active => {}
        _ => return Err(CoreError::CustomerNotFound(customer_id).into()),
    }
    for item in &line_items {
        match state.db.products().get_by_id(&item.product_id).await? {
            Some(product) if product.is_active => {}
            _ => return Err(CoreError::ProductNotFound(item.product_id.clone()).into()),
        }
    }

    let totals = InvoiceTotals::compute(
        &line_items,
        Money::from_cents(body.gst_total_amount.unwrap_or(0)),
        Money::from_cents(body.total_discount.unwrap_or(0)),
    );

    let now = Utc::now();
    let payment_status = body.payment_status.unwrap_or_default();
    let paid_at = match (body.paid_at, payment_status) {
        (Some(at), _) => Some(at),
        (None, PaymentStatus::Paid) => Some(now),
        _ => None,
    };

    let invoice = Invoice {
        id: Uuid::new_v4().to_string(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        invoice_number: generate_invoice_number(),
        customer_id: customer_id.clone(),
        subtotal_cents: totals.subtotal.cents(),
        gst_total_cents: totals.gst_total.cents(),
        discount_cents: totals.discount.cents(),
        total_cents: totals.grand_total.cents(),
        purchase_status: body.purchase_status.unwrap_or_default(),
        payment_status,
        payment_method,
        sold_by,
        notes: body.notes,
        due_date: body.due_date,
        paid_at,
        created_at: now,
        updated_at: now,
    };

    let rows = stored_items(&invoice.id, &line_items, now);
    state.db.invoices().create(&invoice, &rows).await?;

    // Second, independent write: the customer aggregate. Not rolled back if
    // it fails after the invoice landed - surface the error, keep the invoice.
    state
        .db
        .customers()
        .record_purchase(&customer_id, invoice.total_cents, now)
        .await?;

    info!(
        invoice_number = %invoice.invoice_number,
        customer_id = %customer_id,
        total = invoice.total_cents,
        "Invoice created"
    );

    let view = project_flat(&state.db, &invoice).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(view, "Invoice created")),
    ))
}

/// `GET /invoices`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<InvoiceListQuery>,
) -> ApiResult<Json<ListResponse<InvoiceView>>> {
    let (page, limit) = validate_pagination(query.page, query.limit)?;

    let filter = InvoiceFilter {
        purchase_status: query.purchase_status,
        payment_status: query.payment_status,
        customer_id: query.customer_id,
    };

    let (invoices, total) = state.db.invoices().list(page, limit, &filter).await?;

    let mut views = Vec::with_capacity(invoices.len());
    for invoice in &invoices {
        views.push(project_flat(&state.db, invoice).await?);
    }

    Ok(Json(ListResponse::new(
        views,
        Pagination::new(page, limit, total),
    )))
}

/// `GET /invoices/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<InvoiceDetailView>>> {
    let invoice = state
        .db
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::InvoiceNotFound(id))?;

    let view = project_detail(&state.db, &invoice).await?;
    Ok(Json(ApiResponse::new(view, "Invoice retrieved")))
}

/// `PUT /invoices/{id}`
///
/// Merge semantics: absent (or explicit-null) fields keep their stored
/// value. `notes`, `dueDate` and `paidAt` can be set through here but not
/// cleared back to null; nothing on a written invoice is ever un-recorded.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateInvoiceBody>,
) -> ApiResult<Json<ApiResponse<InvoiceDetailView>>> {
    let stored = state
        .db
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| CoreError::InvoiceNotFound(id.clone()))?;

    // Auto-stamp paid_at on the transition into paid, unless the caller
    // supplied one or the invoice already carries one.
    let entering_paid = body.payment_status == Some(PaymentStatus::Paid)
        && stored.payment_status != PaymentStatus::Paid;
    let paid_at = match (body.paid_at, entering_paid, stored.paid_at) {
        (Some(at), _, _) => Some(at),
        (None, true, None) => Some(Utc::now()),
        _ => None,
    };

    state
        .db
        .invoices()
        .update(
            &id,
            &InvoiceUpdate {
                purchase_status: body.purchase_status,
                payment_status: body.payment_status,
                payment_method: body.payment_method,
                notes: body.notes,
                due_date: body.due_date,
                paid_at,
            },
        )
        .await?;

    let updated = state
        .db
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::InvoiceNotFound(id))?;

    let view = project_detail(&state.db, &updated).await?;
    Ok(Json(ApiResponse::new(view, "Invoice updated")))
}

/// `DELETE /invoices/{id}` - soft cancel. The customer aggregate is NOT
/// reversed; it reads as lifetime gross.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<InvoiceDetailView>>> {
    let stored = state
        .db
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| CoreError::InvoiceNotFound(id.clone()))?;

    state.db.invoices().cancel(&id).await?;

    warn!(
        invoice_number = %stored.invoice_number,
        customer_id = %stored.customer_id,
        "Invoice cancelled"
    );

    let cancelled = state
        .db
        .invoices()
        .get_by_id(&id)
        .await?
        .ok_or(CoreError::InvoiceNotFound(id))?;

    let view = project_detail(&state.db, &cancelled).await?;
    Ok(Json(ApiResponse::new(view, "Invoice cancelled")))
}

/// Maps normalized line items to storage rows, numbering positions in input
/// order.
fn stored_items(invoice_id: &str, items: &[LineItem], now: DateTime<Utc>) -> Vec<InvoiceItem> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| InvoiceItem {
            id: Uuid::new_v4().to_string(),
            invoice_id: invoice_id.to_string(),
            product_id: item.product_id.clone(),
            name_snapshot: item.name.clone(),
            sold_price_cents: item.sold_price.cents(),
            position: idx as i64,
            created_at: now,
        })
        .collect()
}
