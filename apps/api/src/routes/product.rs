//! Product catalog routes.
//!
//! Each product row is a one-off sellable unit, so bulk generation creates N
//! rows from one template rather than bumping a stock counter.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use shopkeep_core::validation::{
    validate_name, validate_pagination, validate_price_cents, validate_sku,
};
use shopkeep_core::{Product, ValidationError, DEFAULT_TENANT_ID, MAX_BULK_PRODUCTS};
use shopkeep_db::ProductUpdate;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::response::{ApiResponse, ListResponse, Pagination};
use crate::state::AppState;

// =============================================================================
// Request Bodies
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProductBody {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Listed price in the smallest currency unit.
    pub price: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkProductBody {
    #[serde(flatten)]
    pub template: CreateProductBody,
    pub quantity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub category: Option<String>,
}

// =============================================================================
// Response Shape
// =============================================================================

/// Client-facing product shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        ProductView {
            id: product.id,
            sku: product.sku,
            name: product.name,
            description: product.description,
            category: product.category,
            price: product.price_cents,
            is_active: product.is_active,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn build_product(body: CreateProductBody) -> Result<Product, ValidationError> {
    let sku = body
        .sku
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ValidationError::required("sku"))?
        .to_string();
    validate_sku(&sku)?;

    let name = validate_name("name", body.name.as_deref().unwrap_or(""))?;

    let price = body
        .price
        .ok_or_else(|| ValidationError::required("price"))?;
    validate_price_cents(price)?;

    let now = Utc::now();
    Ok(Product {
        id: Uuid::new_v4().to_string(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        sku,
        name,
        description: body.description,
        category: body.category,
        price_cents: price,
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

/// `POST /products`
pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateProductBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ProductView>>)> {
    let product = build_product(body)?;
    state.db.products().insert(&product).await?;

    info!(sku = %product.sku, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(product.into(), "Product created")),
    ))
}

/// `POST /products/bulk` - N one-off units from one template.
pub async fn create_bulk(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<BulkProductBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<ProductView>>>)> {
    let quantity = body
        .quantity
        .ok_or_else(|| ValidationError::required("quantity"))?;
    if quantity < 1 || quantity > MAX_BULK_PRODUCTS as i64 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_BULK_PRODUCTS as i64,
        }
        .into());
    }

    let template = build_product(body.template)?;
    let created = state
        .db
        .products()
        .insert_bulk(&template, quantity as usize)
        .await?;

    info!(sku_base = %template.sku, count = created.len(), "Products bulk-generated");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            created.into_iter().map(ProductView::from).collect(),
            "Products created",
        )),
    ))
}

/// `GET /products`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<ListResponse<ProductView>>> {
    let (page, limit) = validate_pagination(query.page, query.limit)?;

    let (products, total) = state
        .db
        .products()
        .list(page, limit, query.category.as_deref())
        .await?;

    Ok(Json(ListResponse::new(
        products.into_iter().map(ProductView::from).collect(),
        Pagination::new(page, limit, total),
    )))
}

/// `GET /products/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<ProductView>>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or(shopkeep_db::DbError::not_found("Product", &id))?;

    Ok(Json(ApiResponse::new(product.into(), "Product retrieved")))
}

/// `PUT /products/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateProductBody>,
) -> ApiResult<Json<ApiResponse<ProductView>>> {
    if let Some(ref name) = body.name {
        validate_name("name", name)?;
    }
    if let Some(price) = body.price {
        validate_price_cents(price)?;
    }

    state
        .db
        .products()
        .update(
            &id,
            &ProductUpdate {
                name: body.name,
                description: body.description,
                category: body.category,
                price_cents: body.price,
            },
        )
        .await?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or(shopkeep_db::DbError::not_found("Product", &id))?;

    Ok(Json(ApiResponse::new(product.into(), "Product updated")))
}

/// `DELETE /products/{id}` - soft delete. Historical invoices keep their
/// line items; the invoice projection drops them from flattened output.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    state.db.products().deactivate(&id).await?;

    info!(product_id = %id, "Product deactivated");
    Ok(Json(ApiResponse::new(
        serde_json::Value::Null,
        "Product deleted",
    )))
}
