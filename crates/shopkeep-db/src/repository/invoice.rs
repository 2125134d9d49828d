//! # Invoice Repository
//!
//! Database operations for invoices and their line items.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Invoice Lifecycle                                  │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create() → invoice + items in ONE transaction                   │
//! │         (the customer aggregate bump is a separate write, see           │
//! │          CustomerRepository::record_purchase)                           │
//! │                                                                         │
//! │  2. UPDATE (restricted allow-list)                                      │
//! │     └── update() → statuses, payment method, notes, due date, paid-at   │
//! │                                                                         │
//! │  3. CANCEL (soft delete)                                                │
//! │     └── cancel() → purchase_status = cancelled,                         │
//! │                    payment_status = failed                              │
//! │         Record stays retrievable; nothing is ever physically removed.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use shopkeep_core::{Invoice, InvoiceItem, PaymentMethod, PaymentStatus, PurchaseStatus};

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

/// Filters for the invoice list query.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub purchase_status: Option<PurchaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub customer_id: Option<String>,
}

/// The restricted field set a stored invoice may change through.
/// Everything else (number, customer, items, totals) is immutable.
///
/// `None` keeps the stored value. The nullable fields (notes, due date,
/// paid-at) can be set through here but never cleared back to null.
#[derive(Debug, Clone, Default)]
pub struct InvoiceUpdate {
    pub purchase_status: Option<PurchaseStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Persists an invoice and its line items in one transaction.
    ///
    /// No uniqueness probe is made for the invoice number - the UNIQUE index
    /// is the sole collision guard, and a collision surfaces as a
    /// `UniqueViolation` without retry.
    pub async fn create(&self, invoice: &Invoice, items: &[InvoiceItem]) -> DbResult<()> {
        debug!(
            id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            items = items.len(),
            "Inserting invoice"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, tenant_id, invoice_number, customer_id,
                subtotal_cents, gst_total_cents, discount_cents, total_cents,
                purchase_status, payment_status, payment_method, sold_by,
                notes, due_date, paid_at, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.tenant_id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.customer_id)
        .bind(invoice.subtotal_cents)
        .bind(invoice.gst_total_cents)
        .bind(invoice.discount_cents)
        .bind(invoice.total_cents)
        .bind(invoice.purchase_status)
        .bind(invoice.payment_status)
        .bind(invoice.payment_method)
        .bind(&invoice.sold_by)
        .bind(&invoice.notes)
        .bind(invoice.due_date)
        .bind(invoice.paid_at)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, product_id, name_snapshot,
                    sold_price_cents, position, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.invoice_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.sold_price_cents)
            .bind(item.position)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id, tenant_id, invoice_number, customer_id,
                   subtotal_cents, gst_total_cents, discount_cents, total_cents,
                   purchase_status, payment_status, payment_method, sold_by,
                   notes, due_date, paid_at, created_at, updated_at
            FROM invoices
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    /// Gets all line items for an invoice, in input order.
    pub async fn get_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT id, invoice_id, product_id, name_snapshot,
                   sold_price_cents, position, created_at
            FROM invoice_items
            WHERE invoice_id = ?1
            ORDER BY position
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists invoices, newest first, with optional status/customer filters.
    /// Returns the page plus the total matching count.
    pub async fn list(
        &self,
        page: i64,
        limit: i64,
        filter: &InvoiceFilter,
    ) -> DbResult<(Vec<Invoice>, i64)> {
        let offset = (page - 1) * limit;

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT id, tenant_id, invoice_number, customer_id,
                   subtotal_cents, gst_total_cents, discount_cents, total_cents,
                   purchase_status, payment_status, payment_method, sold_by,
                   notes, due_date, paid_at, created_at, updated_at
            FROM invoices
            "#,
        );
        push_filter(&mut query, filter);
        query.push(" ORDER BY created_at DESC LIMIT ");
        query.push_bind(limit);
        query.push(" OFFSET ");
        query.push_bind(offset);

        let invoices = query
            .build_query_as::<Invoice>()
            .fetch_all(&self.pool)
            .await?;

        let mut count: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM invoices");
        push_filter(&mut count, filter);

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((invoices, total))
    }

    /// Applies a restricted-field update. Absent fields keep their stored
    /// value; the allow-list is enforced by construction (`InvoiceUpdate`
    /// simply has no other fields).
    pub async fn update(&self, id: &str, update: &InvoiceUpdate) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                purchase_status = COALESCE(?2, purchase_status),
                payment_status = COALESCE(?3, payment_status),
                payment_method = COALESCE(?4, payment_method),
                notes = COALESCE(?5, notes),
                due_date = COALESCE(?6, due_date),
                paid_at = COALESCE(?7, paid_at),
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.purchase_status)
        .bind(update.payment_status)
        .bind(update.payment_method)
        .bind(&update.notes)
        .bind(update.due_date)
        .bind(update.paid_at)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }

    /// Soft-cancels an invoice: purchase status → cancelled, payment status
    /// → failed. The record is never physically removed, and the customer
    /// aggregate is intentionally NOT reversed.
    pub async fn cancel(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE invoices SET
                purchase_status = 'cancelled',
                payment_status = 'failed',
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        Ok(())
    }
}

/// Appends the WHERE clause shared by the list and count queries.
fn push_filter(query: &mut QueryBuilder<Sqlite>, filter: &InvoiceFilter) {
    query.push(" WHERE 1 = 1");
    if let Some(status) = filter.purchase_status {
        query.push(" AND purchase_status = ");
        query.push_bind(status);
    }
    if let Some(status) = filter.payment_status {
        query.push(" AND payment_status = ");
        query.push_bind(status);
    }
    if let Some(ref customer_id) = filter.customer_id {
        query.push(" AND customer_id = ");
        query.push_bind(customer_id.clone());
    }
}

/// Generates an invoice number: a fixed literal prefix plus a 10-character
/// random alphanumeric suffix (~62^10 space, collision negligible).
///
/// No uniqueness check is made against existing invoices; the UNIQUE index
/// on `invoice_number` is the sole collision guard.
pub fn generate_invoice_number() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("INV-{suffix}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shopkeep_core::{Customer, DEFAULT_TENANT_ID};
    use uuid::Uuid;

    async fn seed_customer(db: &Database) -> String {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: "Ali Traders".to_string(),
            phone: None,
            email: None,
            address: None,
            total_purchases_cents: 0,
            last_purchase_date: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await.unwrap();
        customer.id
    }

    fn sample_invoice(customer_id: &str, number: &str) -> Invoice {
        let now = Utc::now();
        Invoice {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            invoice_number: number.to_string(),
            customer_id: customer_id.to_string(),
            subtotal_cents: 1200,
            gst_total_cents: 100,
            discount_cents: 50,
            total_cents: 1250,
            purchase_status: PurchaseStatus::Completed,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Cash,
            sold_by: "staff-1".to_string(),
            notes: None,
            due_date: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_items(invoice_id: &str) -> Vec<InvoiceItem> {
        let now = Utc::now();
        vec![
            InvoiceItem {
                id: Uuid::new_v4().to_string(),
                invoice_id: invoice_id.to_string(),
                product_id: "P1".to_string(),
                name_snapshot: "Shirt".to_string(),
                sold_price_cents: 500,
                position: 0,
                created_at: now,
            },
            InvoiceItem {
                id: Uuid::new_v4().to_string(),
                invoice_id: invoice_id.to_string(),
                product_id: "P2".to_string(),
                name_snapshot: "Pants".to_string(),
                sold_price_cents: 700,
                position: 1,
                created_at: now,
            },
        ]
    }

    #[test]
    fn test_invoice_number_format() {
        let number = generate_invoice_number();
        assert!(number.starts_with("INV-"));
        let suffix = &number["INV-".len()..];
        assert_eq!(suffix.len(), 10);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_invoice_numbers_distinct() {
        // Identical payloads still get distinct numbers.
        assert_ne!(generate_invoice_number(), generate_invoice_number());
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer_id = seed_customer(&db).await;
        let invoice = sample_invoice(&customer_id, "INV-abc123XYZ0");
        let items = sample_items(&invoice.id);

        db.invoices().create(&invoice, &items).await.unwrap();

        let fetched = db.invoices().get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(fetched.invoice_number, "INV-abc123XYZ0");
        assert_eq!(fetched.total_cents, 1250);

        let fetched_items = db.invoices().get_items(&invoice.id).await.unwrap();
        assert_eq!(fetched_items.len(), 2);
        assert_eq!(fetched_items[0].name_snapshot, "Shirt");
        assert_eq!(fetched_items[1].name_snapshot, "Pants");
    }

    #[tokio::test]
    async fn test_duplicate_invoice_number_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer_id = seed_customer(&db).await;

        let first = sample_invoice(&customer_id, "INV-same00000X");
        db.invoices().create(&first, &sample_items(&first.id)).await.unwrap();

        let second = sample_invoice(&customer_id, "INV-same00000X");
        let err = db
            .invoices()
            .create(&second, &sample_items(&second.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // The failed transaction left no orphaned items behind.
        let items = db.invoices().get_items(&second.id).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer_a = seed_customer(&db).await;
        let customer_b = seed_customer(&db).await;

        let mut paid = sample_invoice(&customer_a, "INV-paid000000");
        paid.payment_status = PaymentStatus::Paid;
        db.invoices().create(&paid, &sample_items(&paid.id)).await.unwrap();

        let pending = sample_invoice(&customer_b, "INV-pend000000");
        db.invoices().create(&pending, &sample_items(&pending.id)).await.unwrap();

        let (all, total) = db
            .invoices()
            .list(1, 10, &InvoiceFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(total, 2);

        let (paid_only, total) = db
            .invoices()
            .list(
                1,
                10,
                &InvoiceFilter {
                    payment_status: Some(PaymentStatus::Paid),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(paid_only[0].invoice_number, "INV-paid000000");

        let (by_customer, total) = db
            .invoices()
            .list(
                1,
                10,
                &InvoiceFilter {
                    customer_id: Some(customer_b.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(by_customer[0].customer_id, customer_b);
    }

    #[tokio::test]
    async fn test_pagination() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer_id = seed_customer(&db).await;

        for n in 0..5 {
            let invoice = sample_invoice(&customer_id, &format!("INV-page{:06}", n));
            db.invoices().create(&invoice, &[]).await.unwrap();
        }

        let (page, total) = db
            .invoices()
            .list(2, 2, &InvoiceFilter::default())
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(total, 5);
    }

    #[tokio::test]
    async fn test_restricted_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer_id = seed_customer(&db).await;
        let invoice = sample_invoice(&customer_id, "INV-upd0000000");
        db.invoices().create(&invoice, &[]).await.unwrap();

        let paid_at = Utc::now();
        db.invoices()
            .update(
                &invoice.id,
                &InvoiceUpdate {
                    payment_status: Some(PaymentStatus::Paid),
                    paid_at: Some(paid_at),
                    notes: Some("settled in cash".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let fetched = db.invoices().get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(fetched.payment_status, PaymentStatus::Paid);
        assert!(fetched.paid_at.is_some());
        assert_eq!(fetched.notes.as_deref(), Some("settled in cash"));
        // Untouched fields kept their values.
        assert_eq!(fetched.total_cents, 1250);
        assert_eq!(fetched.payment_method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_cancel_is_soft() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer_id = seed_customer(&db).await;
        let invoice = sample_invoice(&customer_id, "INV-del0000000");
        db.invoices().create(&invoice, &[]).await.unwrap();

        db.invoices().cancel(&invoice.id).await.unwrap();

        // Still retrievable, with the cancelled/failed status pair.
        let fetched = db.invoices().get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(fetched.purchase_status, PurchaseStatus::Cancelled);
        assert_eq!(fetched.payment_status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_update_missing_invoice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .invoices()
            .update("missing", &InvoiceUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
