use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One fixed-income holding owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Bond {
    pub id: i64,
    pub user_id: Uuid,
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
}

/// Validated attribute set for an insert or a full update.
/// Only the validation module builds these.
#[derive(Debug, Clone, PartialEq)]
pub struct BondDraft {
    pub name: String,
    pub isin: String,
    pub value: Decimal,
    pub interest_rate: Decimal,
    pub purchase_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub interest_payment_frequency: String,
}

impl Bond {
    /// Apply a draft on top of this record, keeping identity and lifecycle fields
    pub fn apply(&mut self, draft: BondDraft, now: DateTime<Utc>) {
        self.name = draft.name;
        self.isin = draft.isin;
        self.value = draft.value;
        self.interest_rate = draft.interest_rate;
        self.purchase_date = draft.purchase_date;
        self.maturity_date = draft.maturity_date;
        self.interest_payment_frequency = draft.interest_payment_frequency;
        self.updated_at = now;
    }
}

impl std::fmt::Display for Bond {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
