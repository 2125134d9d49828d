//! Staff and attendance routes.
//!
//! Attendance is keyed on `(staff, date)`: the first write of a day inserts
//! with the check-in time, later writes for the same day update status and
//! check-out without duplicating the row.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use shopkeep_core::validation::validate_name;
use shopkeep_core::{AttendanceRecord, AttendanceStatus, Staff, DEFAULT_TENANT_ID};
use shopkeep_db::DbError;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::response::ApiResponse;
use crate::state::AppState;

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateStaffBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceBody {
    /// Defaults to today (UTC) when absent.
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
}

// =============================================================================
// Response Shapes
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffView {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<Staff> for StaffView {
    fn from(staff: Staff) -> Self {
        StaffView {
            id: staff.id,
            name: staff.name,
            phone: staff.phone,
            role: staff.role,
            created_at: staff.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    pub id: String,
    pub staff_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
}

impl From<AttendanceRecord> for AttendanceView {
    fn from(record: AttendanceRecord) -> Self {
        AttendanceView {
            id: record.id,
            staff_id: record.staff_id,
            date: record.date,
            status: record.status,
            check_in: record.check_in,
            check_out: record.check_out,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /staff`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateStaffBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<StaffView>>)> {
    let name = validate_name("name", body.name.as_deref().unwrap_or(""))?;

    let staff = Staff {
        id: Uuid::new_v4().to_string(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        name,
        phone: body.phone,
        role: body.role.unwrap_or_else(|| "staff".to_string()),
        is_active: true,
        created_at: Utc::now(),
    };
    state.db.staff().insert(&staff).await?;

    info!(staff_id = %staff.id, role = %staff.role, "Staff created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(staff.into(), "Staff created")),
    ))
}

/// `GET /staff`
pub async fn list(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<StaffView>>>> {
    let staff = state.db.staff().list().await?;
    Ok(Json(ApiResponse::new(
        staff.into_iter().map(StaffView::from).collect(),
        "Staff retrieved",
    )))
}

/// `GET /staff/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<StaffView>>> {
    let staff = state
        .db
        .staff()
        .get_by_id(&id)
        .await?
        .ok_or(DbError::not_found("Staff", &id))?;

    Ok(Json(ApiResponse::new(staff.into(), "Staff retrieved")))
}

/// `POST /staff/{id}/attendance` - upsert for the day.
pub async fn record_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<AttendanceBody>,
) -> ApiResult<Json<ApiResponse<AttendanceView>>> {
    if state.db.staff().get_by_id(&id).await?.is_none() {
        return Err(DbError::not_found("Staff", &id).into());
    }

    let date = body.date.unwrap_or_else(|| Utc::now().date_naive());
    let status = body.status.unwrap_or_default();
    // A present staff member without an explicit check-in gets stamped now;
    // absent/leave records carry no times unless the caller supplies them.
    let check_in = match (body.check_in, status) {
        (Some(at), _) => Some(at),
        (None, AttendanceStatus::Present) => Some(Utc::now()),
        _ => None,
    };

    let record = state
        .db
        .attendance()
        .upsert(&id, date, status, check_in, body.check_out)
        .await?;

    info!(staff_id = %id, %date, status = ?record.status, "Attendance recorded");
    Ok(Json(ApiResponse::new(record.into(), "Attendance recorded")))
}

/// `GET /staff/{id}/attendance`
pub async fn list_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<AttendanceView>>>> {
    if state.db.staff().get_by_id(&id).await?.is_none() {
        return Err(DbError::not_found("Staff", &id).into());
    }

    let records = state.db.attendance().list_for_staff(&id).await?;
    Ok(Json(ApiResponse::new(
        records.into_iter().map(AttendanceView::from).collect(),
        "Attendance retrieved",
    )))
}
