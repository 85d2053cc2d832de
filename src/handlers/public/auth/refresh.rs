// handlers/public/auth/refresh.rs - POST /api/token/refresh/ handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// POST /api/token/refresh/ - New access token; revoked or expired refresh tokens get 401
pub async fn refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<RefreshResponse> {
    let Json(request) = payload?;
    let access = state.users.refresh(&request.refresh).await?;
    Ok(ApiResponse::success(RefreshResponse { access }))
}
