// handlers/protected/bond/record.rs - GET, PUT, PATCH, DELETE /api/bond/:id/ handlers
//
// Bonds that are missing, deactivated or owned by someone else all answer 404.

use axum::extract::{
    rejection::{JsonRejection, PathRejection, QueryRejection},
    Path, Query, State,
};
use axum::{Extension, Json};
use serde::Deserialize;

use super::bond_id;
use crate::api::format::{bond_to_view, BondView};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::validation::BondPayload;
use crate::valuation;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Remove the row instead of deactivating it
    #[serde(default)]
    pub force: bool,
}

pub async fn bond_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<BondView> {
    let id = bond_id(path)?;
    let bond = state.bonds.retrieve(auth.user_id, id).await?;
    Ok(ApiResponse::success(bond_to_view(&bond, valuation::today())))
}

/// PUT - full update, every writable field required
pub async fn bond_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BondPayload>, JsonRejection>,
) -> ApiResult<BondView> {
    let id = bond_id(path)?;
    let Json(payload) = payload?;
    let bond = state.bonds.update(auth.user_id, id, payload).await?;
    Ok(ApiResponse::success(bond_to_view(&bond, valuation::today())))
}

/// PATCH - partial update, merged over the stored record before validation
pub async fn bond_patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BondPayload>, JsonRejection>,
) -> ApiResult<BondView> {
    let id = bond_id(path)?;
    let Json(patch) = payload?;
    let bond = state.bonds.partial_update(auth.user_id, id, patch).await?;
    Ok(ApiResponse::success(bond_to_view(&bond, valuation::today())))
}

/// DELETE - deactivate, or purge with `?force=true`. Answers 204.
pub async fn bond_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> ApiResult<()> {
    let id = bond_id(path)?;
    let Query(query) = query?;

    if query.force {
        state.bonds.purge(auth.user_id, id).await?;
    } else {
        state.bonds.deactivate(auth.user_id, id).await?;
    }

    Ok(ApiResponse::no_content())
}
