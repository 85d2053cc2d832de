use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{
    self, issue_tokens, normalize_email, validate_email_format, Claims, JwtError, PasswordError,
    TokenKind, TokenPair, PASSWORD_MIN_LENGTH,
};
use crate::config::SecurityConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::User;
use crate::database::store::UserStore;
use crate::validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Unable to log in with provided credentials.")]
    InvalidCredentials,
    #[error("Token has been revoked")]
    Revoked,
    #[error("User not found or inactive")]
    UnknownUser,
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Account registration, token issuance and revocation
pub struct UserService {
    store: Arc<dyn UserStore>,
    security: SecurityConfig,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    pub async fn register(
        &self,
        email: &str,
        password1: &str,
        password2: &str,
    ) -> Result<(User, TokenPair), AuthError> {
        let email = normalize_email(email);
        let mut errors = ValidationErrors::default();

        if let Err(msg) = validate_email_format(&email) {
            errors.add("email", msg);
        }
        if password1.chars().count() < PASSWORD_MIN_LENGTH {
            errors.add(
                "password1",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    PASSWORD_MIN_LENGTH
                ),
            );
        }
        if password1 != password2 {
            errors.add("non_field_errors", "The two password fields didn't match.");
        }
        if errors.is_empty() && self.store.find_by_email(&email).await?.is_some() {
            errors.add("email", "A user is already registered with this e-mail address.");
        }
        if !errors.is_empty() {
            return Err(errors.into());
        }

        let hash = auth::hash_password_blocking(password1, self.security.password_hash_cost).await?;
        let user = self.store.create(&email, &hash).await?;
        tracing::info!("Registered user ID: {}", user.id);

        let tokens = issue_tokens(user.id, &user.email, &self.security)?;
        Ok((user, tokens))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_by_email(&email)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::InvalidCredentials)?;

        if !auth::verify_password_blocking(password, &user.password_hash).await? {
            tracing::warn!("Failed login for user ID: {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.store.record_login(user.id, Utc::now()).await?;
        tracing::info!("User ID: {} logged in", user.id);

        Ok(issue_tokens(user.id, &user.email, &self.security)?)
    }

    /// New access token for a valid, unrevoked refresh token
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = auth::validate_jwt(refresh_token, &self.security.jwt_secret, TokenKind::Refresh)?;
        if self.store.is_token_revoked(claims.jti).await? {
            return Err(AuthError::Revoked);
        }

        let user = self.active_user(claims.sub).await?;
        Ok(auth::generate_jwt(
            &Claims::access(user.id, &user.email, &self.security),
            &self.security.jwt_secret,
        )?)
    }

    /// Revoke the caller's refresh token, if one is supplied
    pub async fn logout(&self, user_id: Uuid, refresh_token: Option<&str>) -> Result<(), AuthError> {
        let Some(token) = refresh_token else {
            return Ok(());
        };

        let claims = auth::validate_jwt(token, &self.security.jwt_secret, TokenKind::Refresh)?;
        if claims.sub != user_id {
            return Err(JwtError::Invalid("token belongs to another user".to_string()).into());
        }

        self.store.revoke_token(claims.jti, claims.expires_at()).await?;
        tracing::info!("User ID: {} logged out", user_id);
        Ok(())
    }

    /// Claims of a valid access token whose user still exists and is active
    pub async fn authenticate(&self, access_token: &str) -> Result<Claims, AuthError> {
        let claims = auth::validate_jwt(access_token, &self.security.jwt_secret, TokenKind::Access)?;
        self.active_user(claims.sub).await?;
        Ok(claims)
    }

    pub async fn current(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.active_user(user_id).await
    }

    async fn active_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.store
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UnknownUser)
    }
}
