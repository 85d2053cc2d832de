// handlers/public/auth/login.rs - POST /api/token/ handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::Deserialize;

use crate::auth::TokenPair;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/**
 * POST /api/token/ - Exchange credentials for an access/refresh pair
 *
 * Bad credentials and inactive accounts both answer 401. A successful
 * login updates the user's `last_login`.
 */
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenPair> {
    let Json(request) = payload?;
    let tokens = state.users.login(&request.email, &request.password).await?;
    Ok(ApiResponse::success(tokens))
}
