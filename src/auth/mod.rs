use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub const PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub token_type: TokenKind,
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: &str, token_type: TokenKind, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email: email.to_string(),
            token_type,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }

    pub fn access(user_id: Uuid, email: &str, security: &SecurityConfig) -> Self {
        Self::new(
            user_id,
            email,
            TokenKind::Access,
            Duration::hours(security.jwt_expiry_hours as i64),
        )
    }

    pub fn refresh(user_id: Uuid, email: &str, security: &SecurityConfig) -> Self {
        Self::new(
            user_id,
            email,
            TokenKind::Refresh,
            Duration::hours(security.refresh_expiry_hours as i64),
        )
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Access/refresh pair handed out at login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token has expired")]
    Expired,

    #[error("Token is not an {0:?} token")]
    WrongKind(TokenKind),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(String),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Decode a token and check signature, expiry and kind
pub fn validate_jwt(token: &str, secret: &str, expected: TokenKind) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let claims = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e.to_string()),
        })?
        .claims;

    if claims.token_type != expected {
        return Err(JwtError::WrongKind(expected));
    }

    Ok(claims)
}

pub fn issue_tokens(user_id: Uuid, email: &str, security: &SecurityConfig) -> Result<TokenPair, JwtError> {
    Ok(TokenPair {
        access: generate_jwt(&Claims::access(user_id, email, security), &security.jwt_secret)?,
        refresh: generate_jwt(&Claims::refresh(user_id, email, security), &security.jwt_secret)?,
    })
}

/// bcrypt hash of `password` at work factor `cost`.
///
/// CPU bound; async callers go through [`hash_password_blocking`].
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Malformed or foreign hashes never verify
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

/// [`hash_password`] on the blocking thread pool
pub async fn hash_password_blocking(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

/// [`verify_password`] on the blocking thread pool
pub async fn verify_password_blocking(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let (password, stored) = (password.to_string(), stored.to_string());
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))
}

/// Basic email validation for registration
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Enter a valid email address.".to_string());
    };

    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err("Enter a valid email address.".to_string());
    }

    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        AppConfig::development().security
    }

    #[test]
    fn access_token_round_trip() {
        let security = security();
        let user = Uuid::new_v4();
        let token = generate_jwt(&Claims::access(user, "a@b.cz", &security), &security.jwt_secret).unwrap();

        let claims = validate_jwt(&token, &security.jwt_secret, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.email, "a@b.cz");
        assert_eq!(claims.token_type, TokenKind::Access);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let security = security();
        let pair = issue_tokens(Uuid::new_v4(), "a@b.cz", &security).unwrap();

        assert!(matches!(
            validate_jwt(&pair.refresh, &security.jwt_secret, TokenKind::Access),
            Err(JwtError::WrongKind(TokenKind::Access))
        ));
        assert!(validate_jwt(&pair.refresh, &security.jwt_secret, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let security = security();
        let claims = Claims::new(Uuid::new_v4(), "a@b.cz", TokenKind::Access, Duration::hours(-2));
        let token = generate_jwt(&claims, &security.jwt_secret).unwrap();

        assert!(matches!(
            validate_jwt(&token, &security.jwt_secret, TokenKind::Access),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let security = security();
        let pair = issue_tokens(Uuid::new_v4(), "a@b.cz", &security).unwrap();
        assert!(matches!(
            validate_jwt(&pair.access, "some-other-secret", TokenKind::Access),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let claims = Claims::new(Uuid::new_v4(), "a@b.cz", TokenKind::Access, Duration::hours(1));
        assert!(matches!(generate_jwt(&claims, ""), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn password_hash_verifies() {
        let stored = hash_password("correct horse", 4).unwrap();
        assert!(stored.starts_with("$2b$04$"));
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_password("same", 4).unwrap(), hash_password("same", 4).unwrap());
    }

    #[test]
    fn invalid_cost_is_an_error() {
        assert!(matches!(hash_password("pw", 2), Err(PasswordError::Hash(_))));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "md5$1$salt$abc"));
        assert!(!verify_password("x", "sha256$10$salt$abc"));
    }

    #[tokio::test]
    async fn blocking_helpers_round_trip() {
        let stored = hash_password_blocking("Str0ngPass!", 4).await.unwrap();
        assert!(verify_password_blocking("Str0ngPass!", &stored).await.unwrap());
        assert!(!verify_password_blocking("nope", &stored).await.unwrap());
    }

    #[test]
    fn email_format() {
        assert!(validate_email_format("user@example.com").is_ok());
        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("userexample.com").is_err());
        assert!(validate_email_format("@example.com").is_err());
        assert!(validate_email_format("user@example").is_err());
        assert!(validate_email_format("user@@example.com").is_err());
        assert!(validate_email_format("us er@example.com").is_err());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  User@Example.COM "), "user@example.com");
    }
}
