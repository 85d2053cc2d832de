//! Investment analysis over a user's active bonds, and its per-user cache.

pub mod cache;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::format::{bond_to_view, BondView};
use crate::database::models::Bond;
use crate::valuation::compute_future_value;

pub use cache::{AnalysisCache, CacheError, CacheStore, MemoryCacheStore};

/// Aggregate figures for one user's active bonds.
///
/// Empty portfolios report null for the average and the nearest bond, and
/// zero for both sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_interest_rate: Option<Decimal>,
    pub nearest_maturity_bond: Option<BondView>,
    pub total_value: Decimal,
    pub future_value: Decimal,
}

/// Compute the analysis for `bonds` as of `as_of`
pub fn analyze(bonds: &[Bond], as_of: NaiveDate) -> AnalysisResult {
    let zero = Decimal::new(0, 2);

    let average_interest_rate = bonds
        .iter()
        .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(b.interest_rate))
        .filter(|_| !bonds.is_empty())
        .and_then(|sum| sum.checked_div(Decimal::from(bonds.len())));

    // min_by_key keeps the last of equal keys; fold keeps the first encountered
    let nearest = bonds.iter().fold(None::<&Bond>, |best, b| match best {
        Some(current) if current.maturity_date <= b.maturity_date => Some(current),
        _ => Some(b),
    });

    let total_value = bonds
        .iter()
        .fold(zero, |acc, b| accumulate(acc, Some(b.value), b.id, "value"));

    let future_value = bonds.iter().fold(zero, |acc, b| {
        accumulate(acc, compute_future_value(b, as_of), b.id, "future value")
    });

    AnalysisResult {
        average_interest_rate,
        nearest_maturity_bond: nearest.map(|b| bond_to_view(b, as_of)),
        total_value,
        future_value,
    }
}

/// Add `amount` to a running total. Undefined amounts, and amounts that would
/// push the total past the decimal range, are left out.
fn accumulate(total: Decimal, amount: Option<Decimal>, bond_id: i64, what: &str) -> Decimal {
    match amount.and_then(|a| total.checked_add(a)) {
        Some(sum) => sum,
        None => {
            tracing::warn!("Bond {} {} excluded from analysis", bond_id, what);
            total
        }
    }
}
