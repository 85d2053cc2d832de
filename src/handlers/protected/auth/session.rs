// handlers/protected/auth/session.rs - POST /api/logout/ handler

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub detail: &'static str,
}

/**
 * POST /api/logout/ - End the session
 *
 * When the body carries `{"refresh": "..."}` that refresh token is revoked
 * and can no longer mint access tokens. The body is optional.
 */
pub async fn logout_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Option<Json<LogoutRequest>>,
) -> ApiResult<LogoutResponse> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    state
        .users
        .logout(auth.user_id, request.refresh.as_deref())
        .await?;

    Ok(ApiResponse::success(LogoutResponse {
        detail: "Successfully logged out.",
    }))
}
