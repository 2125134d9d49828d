//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! Products are one-off units: a row is a single sellable thing, not a
//! quantity-tracked SKU. Bulk generation therefore creates N rows from one
//! template, each with its own SKU.

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use shopkeep_core::Product;

/// How many times a bulk insert retries a colliding SKU before giving up.
const SKU_RETRY_LIMIT: usize = 3;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

/// Optional fields for a targeted product update.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, sku, name, description, category,
                price_cents, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Bulk-generates `count` one-off units from a template.
    ///
    /// SKUs are derived from the template's SKU base plus a running index.
    /// On a unique violation the insert is retried with a short random
    /// suffix; after `SKU_RETRY_LIMIT` collisions the whole call fails and
    /// already-inserted units are left in place (each unit stands alone).
    pub async fn insert_bulk(&self, template: &Product, count: usize) -> DbResult<Vec<Product>> {
        let mut created = Vec::with_capacity(count);

        for n in 1..=count {
            let mut unit = Product {
                id: Uuid::new_v4().to_string(),
                sku: format!("{}-{:04}", template.sku, n),
                ..template.clone()
            };

            let mut attempts = 0;
            loop {
                match self.insert(&unit).await {
                    Ok(()) => break,
                    Err(DbError::UniqueViolation { .. }) if attempts < SKU_RETRY_LIMIT => {
                        attempts += 1;
                        let suffix: String = rand::rng()
                            .sample_iter(&Alphanumeric)
                            .take(4)
                            .map(char::from)
                            .collect();
                        warn!(sku = %unit.sku, attempt = attempts, "SKU collision, retrying with suffix");
                        unit.sku = format!("{}-{:04}-{}", template.sku, n, suffix);
                    }
                    Err(e) => return Err(e),
                }
            }

            created.push(unit);
        }

        Ok(created)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, tenant_id, sku, name, description, category,
                   price_cents, is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products, newest first, optionally filtered by category.
    /// Returns the page plus the total matching count.
    pub async fn list(
        &self,
        page: i64,
        limit: i64,
        category: Option<&str>,
    ) -> DbResult<(Vec<Product>, i64)> {
        let offset = (page - 1) * limit;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, tenant_id, sku, name, description, category,
                   price_cents, is_active, created_at, updated_at
            FROM products
            WHERE is_active = TRUE
              AND (?1 IS NULL OR category = ?1)
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(category)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM products
            WHERE is_active = TRUE
              AND (?1 IS NULL OR category = ?1)
            "#,
        )
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok((products, total))
    }

    /// Updates catalog fields. Absent fields keep their stored value.
    pub async fn update(&self, id: &str, update: &ProductUpdate) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                category = COALESCE(?4, category),
                price_cents = COALESCE(?5, price_cents),
                updated_at = ?6
            WHERE id = ?1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.category)
        .bind(update.price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product. Historical invoices keep referencing it; the
    /// invoice projection silently drops items whose product is gone.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET is_active = FALSE, updated_at = ?2
            WHERE id = ?1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
