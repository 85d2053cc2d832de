use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Bond;
use crate::valuation::compute_future_value;

/// Public wire format of a bond record.
///
/// Mirrors the stored columns (owner exposed as `user`) plus the read-only
/// `future_value`, evaluated on the day the view is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondView {
    pub id: i64,
    pub user: Uuid,
    pub name: String,
    pub isin: String,
    pub value: Decimal,
    pub interest_rate: Decimal,
    pub purchase_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub interest_payment_frequency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub future_value: Option<Decimal>,
}

pub fn bond_to_view(bond: &Bond, as_of: NaiveDate) -> BondView {
    BondView {
        id: bond.id,
        user: bond.user_id,
        name: bond.name.clone(),
        isin: bond.isin.clone(),
        value: bond.value,
        interest_rate: bond.interest_rate,
        purchase_date: bond.purchase_date,
        maturity_date: bond.maturity_date,
        interest_payment_frequency: bond.interest_payment_frequency.clone(),
        is_active: bond.is_active,
        created_at: bond.created_at,
        updated_at: bond.updated_at,
        future_value: compute_future_value(bond, as_of),
    }
}

pub fn bonds_to_views(bonds: &[Bond], as_of: NaiveDate) -> Vec<BondView> {
    bonds.iter().map(|b| bond_to_view(b, as_of)).collect()
}
