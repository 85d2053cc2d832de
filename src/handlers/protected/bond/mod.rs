// handlers/protected/bond/mod.rs - Bond CRUD and investment analysis

use axum::extract::{rejection::PathRejection, Path};

use crate::error::ApiError;

pub mod analysis;   // GET /api/bond/analysis/
pub mod collection; // GET, POST /api/bond/
pub mod record;     // GET, PUT, PATCH, DELETE /api/bond/:id/

pub use analysis::analysis_get;
pub use collection::{bond_list, bond_create};
pub use record::{bond_delete, bond_get, bond_patch, bond_put};

/// Non-numeric ids can never match a bond
fn bond_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::not_found("No Bond matches the given query."))
}
