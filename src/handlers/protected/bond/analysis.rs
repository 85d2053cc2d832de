// handlers/protected/bond/analysis.rs - GET /api/bond/analysis/ handler

use axum::extract::State;
use axum::Extension;

use crate::analysis::AnalysisResult;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/**
 * GET /api/bond/analysis/ - Investment analysis over the caller's active bonds
 *
 * Output:
 * ```json
 * {
 *   "average_interest_rate": 4.5,
 *   "nearest_maturity_bond": { ...bond... },
 *   "total_value": "3000.00",
 *   "future_value": "3100.00"
 * }
 * ```
 * Served from the per-user cache when present; any bond write by the user
 * evicts it.
 */
pub async fn analysis_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<AnalysisResult> {
    let result = state.bonds.analysis(auth.user_id).await?;
    Ok(ApiResponse::success(result))
}
