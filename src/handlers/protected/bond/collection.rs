// handlers/protected/bond/collection.rs - GET, POST /api/bond/ handlers

use axum::extract::{rejection::JsonRejection, State};
use axum::{Extension, Json};

use crate::api::format::{bond_to_view, bonds_to_views, BondView};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::BondPayload;
use crate::valuation;

/// GET /api/bond/ - Active bonds of the caller, each with its current future value
pub async fn bond_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<BondView>> {
    let bonds = state.bonds.list(auth.user_id).await?;
    Ok(ApiResponse::success(bonds_to_views(&bonds, valuation::today())))
}

/**
 * POST /api/bond/ - Create a bond owned by the caller
 *
 * Input: name, isin, value, interest_rate, purchase_date, maturity_date,
 * interest_payment_frequency. Owner and lifecycle fields in the body are
 * ignored. Invalid fields answer 400 with `field_errors`.
 */
pub async fn bond_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    payload: Result<Json<BondPayload>, JsonRejection>,
) -> ApiResult<BondView> {
    let Json(payload) = payload?;
    let bond = state.bonds.create(auth.user_id, payload).await?;
    Ok(ApiResponse::created(bond_to_view(&bond, valuation::today())))
}
