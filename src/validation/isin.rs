//! ISIN verification.
//!
//! An ISIN is a two-letter country code, nine alphanumeric characters and a
//! Luhn check digit computed over the letter-expanded string.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::IsinConfig;

pub const ISIN_LENGTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsinError {
    #[error("ISIN must be exactly 12 characters, got {0}")]
    InvalidLength(usize),

    #[error("ISIN must start with a two-letter country code")]
    InvalidCountryCode,

    #[error("Invalid character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    #[error("ISIN check digit does not match")]
    InvalidCheckDigit,

    #[error("ISIN not found in registry: {0}")]
    NotRegistered(String),

    #[error("Registry lookup failed: {0}")]
    Registry(String),
}

/// Capability that decides whether an ISIN may be stored
#[async_trait]
pub trait IsinVerifier: Send + Sync {
    async fn verify(&self, isin: &str) -> Result<(), IsinError>;
}

/// Structural check without any network access
pub fn validate_isin(isin: &str) -> Result<(), IsinError> {
    let chars: Vec<char> = isin.chars().collect();
    if chars.len() != ISIN_LENGTH {
        return Err(IsinError::InvalidLength(chars.len()));
    }

    if !chars[0].is_ascii_uppercase() || !chars[1].is_ascii_uppercase() {
        return Err(IsinError::InvalidCountryCode);
    }

    for (position, &ch) in chars.iter().enumerate().skip(2) {
        if !(ch.is_ascii_digit() || ch.is_ascii_uppercase()) {
            return Err(IsinError::InvalidCharacter { ch, position });
        }
    }

    if !chars[ISIN_LENGTH - 1].is_ascii_digit() || !check_digit_matches(&chars) {
        return Err(IsinError::InvalidCheckDigit);
    }

    Ok(())
}

fn check_digit_matches(chars: &[char]) -> bool {
    // A=10 .. Z=35, letters expand to two digits
    let mut digits = Vec::with_capacity(chars.len() * 2);
    for &c in chars {
        match c.to_digit(36) {
            Some(v) if v >= 10 => {
                digits.push(v / 10);
                digits.push(v % 10);
            }
            Some(v) => digits.push(v),
            None => return false,
        }
    }

    // Luhn: double every second digit from the right, excluding the check digit
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                doubled / 10 + doubled % 10
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Offline verifier: structure and check digit only
#[derive(Debug, Default, Clone, Copy)]
pub struct ChecksumIsinVerifier;

#[async_trait]
impl IsinVerifier for ChecksumIsinVerifier {
    async fn verify(&self, isin: &str) -> Result<(), IsinError> {
        validate_isin(isin)
    }
}

/// Checks the ISIN against the public registry of issued ISINs.
///
/// The structural check runs first so obviously malformed values never leave
/// the process. Any non-success status or transport error rejects the ISIN.
pub struct RegistryIsinVerifier {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryIsinVerifier {
    pub fn new(config: &IsinConfig) -> Result<Self, IsinError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IsinError::Registry(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.registry_url.clone(),
        })
    }
}

#[async_trait]
impl IsinVerifier for RegistryIsinVerifier {
    async fn verify(&self, isin: &str) -> Result<(), IsinError> {
        validate_isin(isin)?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("isin", isin)])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("ISIN registry request for {} failed: {}", isin, e);
                IsinError::Registry(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IsinError::NotRegistered(isin.to_string()));
        }
        if !status.is_success() {
            tracing::warn!("ISIN registry answered {} for {}", status, isin);
            return Err(IsinError::Registry(format!("registry returned {}", status)));
        }

        tracing::debug!("ISIN {} confirmed by registry", isin);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_real_isins() {
        for isin in [
            "CZ0003551251",
            "CZ0001007306",
            "CZ0001005037",
            "US0378331005",
            "DE0001102580",
            "XS2314659447",
        ] {
            assert_eq!(validate_isin(isin), Ok(()), "{}", isin);
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(validate_isin("INVALIDISIN"), Err(IsinError::InvalidLength(11)));
        assert_eq!(validate_isin(""), Err(IsinError::InvalidLength(0)));
    }

    #[test]
    fn rejects_bad_country_code() {
        assert_eq!(validate_isin("1Z0003551251"), Err(IsinError::InvalidCountryCode));
        assert_eq!(validate_isin("cz0003551251"), Err(IsinError::InvalidCountryCode));
    }

    #[test]
    fn rejects_bad_characters() {
        assert_eq!(
            validate_isin("CZ00035-1251"),
            Err(IsinError::InvalidCharacter { ch: '-', position: 7 })
        );
    }

    #[test]
    fn rejects_bad_check_digit() {
        assert_eq!(validate_isin("CZ0003551252"), Err(IsinError::InvalidCheckDigit));
        assert_eq!(validate_isin("TEST00000000"), Err(IsinError::InvalidCheckDigit));
    }

    #[tokio::test]
    async fn checksum_verifier_delegates() {
        let verifier = ChecksumIsinVerifier;
        assert!(verifier.verify("US0378331005").await.is_ok());
        assert!(verifier.verify("US0378331006").await.is_err());
    }

    #[tokio::test]
    async fn registry_verifier_checks_structure_before_network() {
        let verifier = RegistryIsinVerifier::new(&IsinConfig {
            registry_lookup: true,
            registry_url: "http://127.0.0.1:9/unreachable".to_string(),
            timeout_secs: 1,
        })
        .unwrap();

        assert_eq!(
            verifier.verify("INVALIDISIN").await,
            Err(IsinError::InvalidLength(11))
        );
    }
}
