//! # Attendance Repository
//!
//! Database operations for staff attendance.
//!
//! ## Upsert-By-Date
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /staff/{id}/attendance                                           │
//! │                                                                         │
//! │  First write of the day:                                               │
//! │    INSERT (staff_id, date, status, check_in, ...)                      │
//! │                                                                         │
//! │  Later writes for the same day hit UNIQUE(staff_id, date):            │
//! │    ON CONFLICT DO UPDATE - status and check_out are refreshed,         │
//! │    the original check_in is kept.                                      │
//! │                                                                         │
//! │  One row per staff member per day, no duplicates.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use shopkeep_core::{AttendanceRecord, AttendanceStatus};

/// Repository for attendance database operations.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: SqlitePool,
}

impl AttendanceRepository {
    /// Creates a new AttendanceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AttendanceRepository { pool }
    }

    /// Upserts the attendance record for `(staff_id, date)` and returns the
    /// stored row.
    ///
    /// The first write of the day inserts; subsequent writes update status
    /// and check-out while keeping the first check-in time.
    pub async fn upsert(
        &self,
        staff_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
        check_in: Option<DateTime<Utc>>,
        check_out: Option<DateTime<Utc>>,
    ) -> DbResult<AttendanceRecord> {
        debug!(staff_id = %staff_id, %date, "Upserting attendance");

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO attendance (id, staff_id, date, status, check_in, check_out, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            ON CONFLICT (staff_id, date) DO UPDATE SET
                status = excluded.status,
                check_in = COALESCE(attendance.check_in, excluded.check_in),
                check_out = COALESCE(excluded.check_out, attendance.check_out),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(staff_id)
        .bind(date)
        .bind(status)
        .bind(check_in)
        .bind(check_out)
        .bind(now)
        .execute(&self.pool)
        .await?;

        // The upsert either inserted our row or updated the existing one;
        // re-read by the natural key to return what is actually stored.
        let record = self.get(staff_id, date).await?.ok_or_else(|| {
            crate::error::DbError::Internal("attendance row missing after upsert".to_string())
        })?;

        Ok(record)
    }

    /// Gets the attendance record for one staff member on one date.
    pub async fn get(
        &self,
        staff_id: &str,
        date: NaiveDate,
    ) -> DbResult<Option<AttendanceRecord>> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, staff_id, date, status, check_in, check_out, created_at, updated_at
            FROM attendance
            WHERE staff_id = ?1 AND date = ?2
            "#,
        )
        .bind(staff_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists a staff member's attendance, most recent date first.
    pub async fn list_for_staff(&self, staff_id: &str) -> DbResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, staff_id, date, status, check_in, check_out, created_at, updated_at
            FROM attendance
            WHERE staff_id = ?1
            ORDER BY date DESC
            "#,
        )
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shopkeep_core::{Staff, DEFAULT_TENANT_ID};

    async fn seed_staff(db: &Database) -> String {
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
        staff.id
    }

    #[tokio::test]
    async fn test_first_write_inserts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let staff_id = seed_staff(&db).await;
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();

        let record = db
            .attendance()
            .upsert(&staff_id, date, AttendanceStatus::Present, Some(Utc::now()), None)
            .await
            .unwrap();

        assert_eq!(record.status, AttendanceStatus::Present);
        assert!(record.check_in.is_some());
        assert!(record.check_out.is_none());
    }

    #[tokio::test]
    async fn test_same_day_write_updates_not_duplicates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let staff_id = seed_staff(&db).await;
        let date = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();

        let morning = Utc::now();
        let first = db
            .attendance()
            .upsert(&staff_id, date, AttendanceStatus::Present, Some(morning), None)
            .await
            .unwrap();

        let evening = Utc::now();
        let second = db
            .attendance()
            .upsert(&staff_id, date, AttendanceStatus::Present, Some(evening), Some(evening))
            .await
            .unwrap();

        // Same row, original check-in preserved, check-out recorded.
        assert_eq!(first.id, second.id);
        assert_eq!(second.check_in, first.check_in);
        assert!(second.check_out.is_some());

        let all = db.attendance().list_for_staff(&staff_id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_days_get_distinct_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let staff_id = seed_staff(&db).await;

        let monday = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();

        db.attendance()
            .upsert(&staff_id, monday, AttendanceStatus::Present, Some(Utc::now()), None)
            .await
            .unwrap();
        db.attendance()
            .upsert(&staff_id, tuesday, AttendanceStatus::Leave, None, None)
            .await
            .unwrap();

        let all = db.attendance().list_for_staff(&staff_id).await.unwrap();
        assert_eq!(all.len(), 2);
        // Most recent first.
        assert_eq!(all[0].date, tuesday);
        assert_eq!(all[0].status, AttendanceStatus::Leave);
    }
}
