//! Liveness probe.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::error::{ApiError, ApiResult};
use crate::response::ApiResponse;
use crate::state::AppState;

/// `GET /health` - verifies the database can still execute queries.
pub async fn health(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    if !state.db.health_check().await {
        tracing::error!("Health check failed: database unreachable");
        return Err(ApiError::Internal);
    }

    Ok(Json(ApiResponse::new(json!({ "status": "ok" }), "Healthy")))
}
