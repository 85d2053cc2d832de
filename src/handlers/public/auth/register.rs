// handlers/public/auth/register.rs - POST /api/registration/ handler

use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::database::models::UserView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserView,
    pub access: String,
    pub refresh: String,
}

/**
 * POST /api/registration/ - Create an account and log it in
 *
 * Input: `{"email", "password1", "password2"}`
 * Output (201): `{"user": {...}, "access": "...", "refresh": "..."}`
 */
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let Json(request) = payload?;

    let (user, tokens) = state
        .users
        .register(&request.email, &request.password1, &request.password2)
        .await?;

    Ok(ApiResponse::created(RegisterResponse {
        user: UserView::from(&user),
        access: tokens.access,
        refresh: tokens.refresh,
    }))
}
