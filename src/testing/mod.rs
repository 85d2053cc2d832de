//! Fixtures shared by unit tests

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::database::models::{Bond, BondDraft};
use crate::validation::{IsinError, IsinVerifier};

pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// 1000.00 at 5.00 %, bought a year before maturity
pub fn draft(isin: &str) -> BondDraft {
    let maturity = ymd(2030, 1, 1);
    BondDraft {
        name: format!("Bond {}", isin),
        isin: isin.to_string(),
        value: dec!(1000.00),
        interest_rate: dec!(5.00),
        purchase_date: maturity - Duration::days(365),
        maturity_date: maturity,
        interest_payment_frequency: "Annually".to_string(),
    }
}

/// Active stored bond with the [`draft`] terms maturing on `maturity`
pub fn bond_maturing(user_id: Uuid, id: i64, maturity: NaiveDate) -> Bond {
    let now = Utc::now();
    Bond {
        id,
        user_id,
        name: format!("Bond #{}", id),
        isin: format!("TEST{:08}", id),
        value: dec!(1000.00),
        interest_rate: dec!(5.00),
        purchase_date: maturity - Duration::days(365),
        maturity_date: maturity,
        interest_payment_frequency: "Annually".to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Verifier that rejects a fixed set of ISINs and accepts everything else
#[derive(Default)]
pub struct StubIsinVerifier {
    rejected: HashSet<String>,
}

impl StubIsinVerifier {
    pub fn rejecting(isins: &[&str]) -> Self {
        Self {
            rejected: isins.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl IsinVerifier for StubIsinVerifier {
    async fn verify(&self, isin: &str) -> Result<(), IsinError> {
        if self.rejected.contains(isin) {
            return Err(IsinError::NotRegistered(isin.to_string()));
        }
        Ok(())
    }
}
