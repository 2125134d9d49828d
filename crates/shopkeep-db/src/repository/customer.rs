//! # Customer Repository
//!
//! Database operations for customers, including the purchase aggregates the
//! invoice write path maintains.
//!
//! ## Aggregate Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_purchase(customer, grand_total, now)                           │
//! │                                                                         │
//! │  UPDATE customers SET                                                  │
//! │      total_purchases_cents = total_purchases_cents + ?   ← atomic      │
//! │      last_purchase_date    = ?                                         │
//! │                                                                         │
//! │  The increment happens at the storage layer, never read-modify-write   │
//! │  in application code, so two concurrent invoice creations against the  │
//! │  same customer cannot lose an update.                                  │
//! │                                                                         │
//! │  Cancelling an invoice does NOT decrement: the aggregate reads as      │
//! │  lifetime gross, not current balance.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use shopkeep_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

/// Optional profile fields for a targeted customer update.
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, tenant_id, name, phone, email, address,
                total_purchases_cents, last_purchase_date,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.tenant_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.total_purchases_cents)
        .bind(customer.last_purchase_date)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, tenant_id, name, phone, email, address,
                   total_purchases_cents, last_purchase_date,
                   is_active, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists active customers, newest first, with an optional name/phone
    /// search. Returns the page plus the total matching count.
    pub async fn list(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
    ) -> DbResult<(Vec<Customer>, i64)> {
        let offset = (page - 1) * limit;
        let pattern = search.map(|s| format!("%{s}%"));

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, tenant_id, name, phone, email, address,
                   total_purchases_cents, last_purchase_date,
                   is_active, created_at, updated_at
            FROM customers
            WHERE is_active = TRUE
              AND (?1 IS NULL OR name LIKE ?1 OR phone LIKE ?1)
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM customers
            WHERE is_active = TRUE
              AND (?1 IS NULL OR name LIKE ?1 OR phone LIKE ?1)
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((customers, total))
    }

    /// Updates profile fields. Absent fields keep their stored value.
    pub async fn update(&self, id: &str, update: &CustomerUpdate) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = COALESCE(?2, name),
                phone = COALESCE(?3, phone),
                email = COALESCE(?4, email),
                address = COALESCE(?5, address),
                updated_at = ?6
            WHERE id = ?1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Records a purchase against the customer's running aggregates.
    ///
    /// The increment is a storage-level `x = x + ?` so concurrent invoice
    /// creations against the same customer cannot lose an update. This is a
    /// separate statement from the invoice insert - the two writes are not
    /// jointly atomic.
    pub async fn record_purchase(
        &self,
        id: &str,
        amount_cents: i64,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(customer_id = %id, amount = amount_cents, "Recording purchase aggregate");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                total_purchases_cents = total_purchases_cents + ?2,
                last_purchase_date = ?3,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(amount_cents)
        .bind(at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Soft-deletes a customer.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET is_active = FALSE, updated_at = ?2
            WHERE id = ?1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shopkeep_core::DEFAULT_TENANT_ID;
    use uuid::Uuid;

    fn sample_customer() -> Customer {
        let now = Utc::now();
        Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: "Ali Traders".to_string(),
            phone: Some("0300-1234567".to_string()),
            email: None,
            address: None,
            total_purchases_cents: 0,
            last_purchase_date: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = sample_customer();

        db.customers().insert(&customer).await.unwrap();

        let fetched = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Ali Traders");
        assert_eq!(fetched.total_purchases_cents, 0);
        assert!(fetched.last_purchase_date.is_none());
    }

    #[tokio::test]
    async fn test_record_purchase_increments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = sample_customer();
        db.customers().insert(&customer).await.unwrap();

        let now = Utc::now();
        db.customers()
            .record_purchase(&customer.id, 1250, now)
            .await
            .unwrap();
        db.customers()
            .record_purchase(&customer.id, 750, now)
            .await
            .unwrap();

        let fetched = db.customers().get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(fetched.total_purchases_cents, 2000);
        assert!(fetched.last_purchase_date.is_some());
    }

    #[tokio::test]
    async fn test_record_purchase_unknown_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .customers()
            .record_purchase("missing", 100, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = sample_customer();
        db.customers().insert(&customer).await.unwrap();

        let (listed, total) = db.customers().list(1, 10, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(total, 1);

        db.customers().deactivate(&customer.id).await.unwrap();

        let (listed, total) = db.customers().list(1, 10, None).await.unwrap();
        assert!(listed.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut a = sample_customer();
        a.name = "Ahmed Khan".to_string();
        let b = sample_customer();
        db.customers().insert(&a).await.unwrap();
        db.customers().insert(&b).await.unwrap();

        let (found, total) = db.customers().list(1, 10, Some("Ahmed")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(found[0].name, "Ahmed Khan");
    }
}
