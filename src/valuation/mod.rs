//! Future value of a single bond holding.
//!
//! `fv = principal * (1 + rate / 100) ^ (days_to_maturity / 365)`, evaluated
//! in decimal arithmetic and rounded half-to-even to cents at the very end.

use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

use crate::database::models::Bond;

/// Day-count basis: a flat 365-day year, no leap adjustment
const DAYS_PER_YEAR: i64 = 365;

/// Fractional digits kept in a reported future value
const CENTS: u32 = 2;

/// Projected value of `principal` at `maturity_date`, compounding annually at
/// `annual_rate_percent` from `as_of` onwards.
///
/// Returns `None` when either date is missing, or if the growth overflows the
/// decimal range. Past maturity the exponent is negative and the formula is
/// still applied; a discount too deep to represent yields `0.00`.
pub fn future_value(
    principal: Decimal,
    annual_rate_percent: Decimal,
    purchase_date: Option<NaiveDate>,
    maturity_date: Option<NaiveDate>,
    as_of: NaiveDate,
) -> Option<Decimal> {
    let (_purchase, maturity) = (purchase_date?, maturity_date?);

    let days = (maturity - as_of).num_days();
    let years = Decimal::from(days).checked_div(Decimal::from(DAYS_PER_YEAR))?;
    let growth = Decimal::ONE.checked_add(annual_rate_percent.checked_div(Decimal::ONE_HUNDRED)?)?;

    // Whole-year exponents take the exact integer power inside checked_powd
    let years = years.normalize();
    let factor = if years.is_sign_negative() {
        // A discount power beyond the decimal range leaves a factor below its precision
        growth
            .checked_powd(-years)
            .and_then(|power| Decimal::ONE.checked_div(power))
            .unwrap_or(Decimal::ZERO)
    } else {
        growth.checked_powd(years)?
    };
    let value = principal.checked_mul(factor)?;

    let mut value = value.round_dp_with_strategy(CENTS, RoundingStrategy::MidpointNearestEven);
    value.rescale(CENTS);
    Some(value)
}

/// Future value of a stored bond as of `as_of`
pub fn compute_future_value(bond: &Bond, as_of: NaiveDate) -> Option<Decimal> {
    future_value(
        bond.value,
        bond.interest_rate,
        Some(bond.purchase_date),
        Some(bond.maturity_date),
        as_of,
    )
}

/// The evaluation date used by request handlers
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
