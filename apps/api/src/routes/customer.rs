//! Customer routes.
//!
//! Customer rows carry the running purchase aggregates the invoice write
//! path maintains; these handlers only ever read them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use shopkeep_core::validation::{validate_name, validate_pagination};
use shopkeep_core::{Customer, DEFAULT_TENANT_ID};
use shopkeep_db::{CustomerUpdate, DbError};

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::response::{ApiResponse, ListResponse, Pagination};
use crate::state::AppState;

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCustomerBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCustomerBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Matches against name or phone.
    pub search: Option<String>,
}

// =============================================================================
// Response Shape
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Lifetime gross, in the smallest currency unit. Never decremented,
    /// not even when an invoice is cancelled.
    pub total_purchases: i64,
    pub last_purchase_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        CustomerView {
            id: customer.id,
            name: customer.name,
            phone: customer.phone,
            email: customer.email,
            address: customer.address,
            total_purchases: customer.total_purchases_cents,
            last_purchase_date: customer.last_purchase_date,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /customers`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCustomerBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CustomerView>>)> {
    let name = validate_name("name", body.name.as_deref().unwrap_or(""))?;

    let now = Utc::now();
    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        name,
        phone: body.phone,
        email: body.email,
        address: body.address,
        total_purchases_cents: 0,
        last_purchase_date: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    state.db.customers().insert(&customer).await?;

    info!(customer_id = %customer.id, "Customer created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(customer.into(), "Customer created")),
    ))
}

/// `GET /customers`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CustomerListQuery>,
) -> ApiResult<Json<ListResponse<CustomerView>>> {
    let (page, limit) = validate_pagination(query.page, query.limit)?;

    let (customers, total) = state
        .db
        .customers()
        .list(page, limit, query.search.as_deref())
        .await?;

    Ok(Json(ListResponse::new(
        customers.into_iter().map(CustomerView::from).collect(),
        Pagination::new(page, limit, total),
    )))
}

/// `GET /customers/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<CustomerView>>> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or(DbError::not_found("Customer", &id))?;

    Ok(Json(ApiResponse::new(customer.into(), "Customer retrieved")))
}

/// `PUT /customers/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateCustomerBody>,
) -> ApiResult<Json<ApiResponse<CustomerView>>> {
    if let Some(ref name) = body.name {
        validate_name("name", name)?;
    }

    state
        .db
        .customers()
        .update(
            &id,
            &CustomerUpdate {
                name: body.name,
                phone: body.phone,
                email: body.email,
                address: body.address,
            },
        )
        .await?;

    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or(DbError::not_found("Customer", &id))?;

    Ok(Json(ApiResponse::new(customer.into(), "Customer updated")))
}

/// `DELETE /customers/{id}` - soft delete. Existing invoices keep their
/// reference; the row just stops appearing in lists.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    state.db.customers().deactivate(&id).await?;

    info!(customer_id = %id, "Customer deactivated");
    Ok(Json(ApiResponse::new(
        serde_json::Value::Null,
        "Customer deleted",
    )))
}
