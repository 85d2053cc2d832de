//! Request-body validation for bond writes.
//!
//! A [`BondPayload`] is the loosely-typed body of a create or update request.
//! [`BondPayload::validate`] either produces a [`BondDraft`] that satisfies
//! every record invariant, or the full set of per-field errors.

pub mod isin;

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::database::models::{Bond, BondDraft};

pub use isin::{validate_isin, ChecksumIsinVerifier, IsinError, IsinVerifier, RegistryIsinVerifier};

pub const NAME_MAX_CHARS: usize = 255;
pub const FREQUENCY_MAX_CHARS: usize = 50;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Digit limits of a fixed-point column
struct DecimalShape {
    max_digits: u32,
    decimal_places: u32,
}

const VALUE_SHAPE: DecimalShape = DecimalShape {
    max_digits: 10,
    decimal_places: 2,
};

const RATE_SHAPE: DecimalShape = DecimalShape {
    max_digits: 5,
    decimal_places: 2,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Invalid request data")]
pub struct ValidationErrors {
    pub field_errors: HashMap<String, String>,
}

impl ValidationErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    /// Keeps the first message recorded for a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }
}

/// Writable bond attributes as received over the wire.
///
/// Money fields accept either a JSON string or a number. Read-only keys
/// (`id`, `user`, `is_active`, `future_value`, timestamps) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BondPayload {
    pub name: Option<String>,
    pub isin: Option<String>,
    pub value: Option<Value>,
    pub interest_rate: Option<Value>,
    pub purchase_date: Option<String>,
    pub maturity_date: Option<String>,
    pub interest_payment_frequency: Option<String>,
}

impl BondPayload {
    /// Payload holding every attribute of an existing record
    pub fn from_bond(bond: &Bond) -> Self {
        Self {
            name: Some(bond.name.clone()),
            isin: Some(bond.isin.clone()),
            value: Some(Value::String(bond.value.to_string())),
            interest_rate: Some(Value::String(bond.interest_rate.to_string())),
            purchase_date: Some(bond.purchase_date.format(DATE_FORMAT).to_string()),
            maturity_date: Some(bond.maturity_date.format(DATE_FORMAT).to_string()),
            interest_payment_frequency: Some(bond.interest_payment_frequency.clone()),
        }
    }

    /// Overlay the fields present in `patch`
    pub fn merge(self, patch: BondPayload) -> Self {
        Self {
            name: patch.name.or(self.name),
            isin: patch.isin.or(self.isin),
            value: patch.value.or(self.value),
            interest_rate: patch.interest_rate.or(self.interest_rate),
            purchase_date: patch.purchase_date.or(self.purchase_date),
            maturity_date: patch.maturity_date.or(self.maturity_date),
            interest_payment_frequency: patch
                .interest_payment_frequency
                .or(self.interest_payment_frequency),
        }
    }

    /// Check every field and the cross-field date order.
    ///
    /// The ISIN is only checked for presence here; its structure and
    /// registration are the verifier's concern.
    pub fn validate(&self) -> Result<BondDraft, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = text_field(&mut errors, "name", self.name.as_deref(), NAME_MAX_CHARS);
        let isin = text_field(&mut errors, "isin", self.isin.as_deref(), isin::ISIN_LENGTH);
        let frequency = text_field(
            &mut errors,
            "interest_payment_frequency",
            self.interest_payment_frequency.as_deref(),
            FREQUENCY_MAX_CHARS,
        );

        let value = decimal_field(&mut errors, "value", self.value.as_ref(), &VALUE_SHAPE);
        if let Some(v) = value {
            if v <= Decimal::ZERO {
                errors.add("value", "Ensure this value is greater than or equal to 0.01.");
            }
        }

        let interest_rate =
            decimal_field(&mut errors, "interest_rate", self.interest_rate.as_ref(), &RATE_SHAPE);
        if let Some(r) = interest_rate {
            if r < Decimal::ZERO || r > Decimal::ONE_HUNDRED {
                errors.add(
                    "interest_rate",
                    "Interest rate must be between 0 and 100 percent.",
                );
            }
        }

        let purchase_date = date_field(&mut errors, "purchase_date", self.purchase_date.as_deref());
        let maturity_date = date_field(&mut errors, "maturity_date", self.maturity_date.as_deref());
        if let (Some(p), Some(m)) = (purchase_date, maturity_date) {
            if p > m {
                errors.add(
                    "maturity_date",
                    "Maturity date must be later than purchase date.",
                );
            }
        }

        match (name, isin, value, interest_rate, purchase_date, maturity_date, frequency) {
            (
                Some(name),
                Some(isin),
                Some(value),
                Some(interest_rate),
                Some(purchase_date),
                Some(maturity_date),
                Some(interest_payment_frequency),
            ) if errors.is_empty() => Ok(BondDraft {
                name,
                isin,
                value,
                interest_rate,
                purchase_date,
                maturity_date,
                interest_payment_frequency,
            }),
            _ => Err(errors),
        }
    }
}

fn text_field(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&str>,
    max_chars: usize,
) -> Option<String> {
    let Some(raw) = raw else {
        errors.add(field, REQUIRED);
        return None;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if trimmed.chars().count() > max_chars {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", max_chars),
        );
        return None;
    }

    Some(trimmed.to_string())
}

fn decimal_field(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&Value>,
    shape: &DecimalShape,
) -> Option<Decimal> {
    let Some(raw) = raw else {
        errors.add(field, REQUIRED);
        return None;
    };

    let Some(parsed) = parse_decimal(raw) else {
        errors.add(field, "A valid number is required.");
        return None;
    };

    match fit_shape(parsed, shape) {
        Ok(d) => Some(d),
        Err(msg) => {
            errors.add(field, msg);
            None
        }
    }
}

fn parse_decimal(raw: &Value) -> Option<Decimal> {
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Enforce digit limits and return the value at the column's scale
fn fit_shape(value: Decimal, shape: &DecimalShape) -> Result<Decimal, String> {
    let normalized = value.normalize();

    if normalized.scale() > shape.decimal_places {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            shape.decimal_places
        ));
    }

    let whole = normalized.trunc().abs();
    let whole_digits = if whole.is_zero() {
        0
    } else {
        whole.to_string().split('.').next().map_or(0, str::len) as u32
    };
    let max_whole = shape.max_digits - shape.decimal_places;
    if whole_digits > max_whole {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            max_whole
        ));
    }

    let mut fitted = normalized;
    fitted.rescale(shape.decimal_places);
    Ok(fitted)
}

fn date_field(errors: &mut ValidationErrors, field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let Some(raw) = raw else {
        errors.add(field, REQUIRED);
        return None;
    };

    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.");
            None
        }
    }
}
