//! # Staff Repository
//!
//! Database operations for staff members. Invoices reference staff via
//! `sold_by`; the invoice flow does not otherwise validate staff beyond
//! requiring the reference to be present.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use shopkeep_core::Staff;

/// Repository for staff database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Inserts a new staff member.
    pub async fn insert(&self, staff: &Staff) -> DbResult<()> {
        debug!(id = %staff.id, name = %staff.name, "Inserting staff");

        sqlx::query(
            r#"
            INSERT INTO staff (id, tenant_id, name, phone, role, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.tenant_id)
        .bind(&staff.name)
        .bind(&staff.phone)
        .bind(&staff.role)
        .bind(staff.is_active)
        .bind(staff.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a staff member by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(
            r#"
            SELECT id, tenant_id, name, phone, role, is_active, created_at
            FROM staff
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Lists active staff members, newest first.
    pub async fn list(&self) -> DbResult<Vec<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(
            r#"
            SELECT id, tenant_id, name, phone, role, is_active, created_at
            FROM staff
            WHERE is_active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(staff)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use shopkeep_core::DEFAULT_TENANT_ID;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let staff = Staff {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: "Bilal".to_string(),
            phone: None,
            role: "cashier".to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        db.staff().insert(&staff).await.unwrap();

        let listed = db.staff().list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].role, "cashier");
    }
}
