// handlers/protected/auth/user.rs - GET /api/user/ handler

use axum::extract::State;
use axum::Extension;

use crate::database::models::UserView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/user/ - Details of the authenticated user
pub async fn user_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<UserView> {
    let user = state.users.current(auth.user_id).await?;
    Ok(ApiResponse::success(UserView::from(&user)))
}
