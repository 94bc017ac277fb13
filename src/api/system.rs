use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HealthDto};
use crate::domain::Strategy;

/// `GET /healthcheck`. Pings all three stores.
pub async fn healthcheck(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthDto>>, ApiError> {
    state
        .shared
        .catalog
        .ping()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(HealthDto {
        status: "available",
        uptime_seconds: state.shared.start_time.elapsed().as_secs(),
        strategies: Strategy::ALL.iter().map(|s| s.as_str()).collect(),
    })))
}
