use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Bond, BondDraft, User};

/// Persistence contract for bond records.
///
/// Every method is scoped to the owning user; a bond that exists but belongs
/// to someone else is reported exactly like a missing one. "Active" lookups
/// ignore deactivated bonds, "owned" lookups see them.
#[async_trait]
pub trait BondStore: Send + Sync {
    /// All bonds of the user with the active flag set, in no particular order
    async fn list_active(&self, user_id: Uuid) -> Result<Vec<Bond>, DatabaseError>;

    async fn get_active(&self, user_id: Uuid, id: i64) -> Result<Option<Bond>, DatabaseError>;

    async fn get_owned(&self, user_id: Uuid, id: i64) -> Result<Option<Bond>, DatabaseError>;

    async fn create(&self, user_id: Uuid, draft: BondDraft) -> Result<Bond, DatabaseError>;

    /// Replace the attributes of an active bond
    async fn update(&self, user_id: Uuid, id: i64, draft: BondDraft) -> Result<Bond, DatabaseError>;

    /// Soft delete: clear the active flag, keep the row
    async fn deactivate(&self, user_id: Uuid, id: i64) -> Result<Bond, DatabaseError>;

    /// Forced delete: remove the row, returning what was removed
    async fn purge(&self, user_id: Uuid, id: i64) -> Result<Bond, DatabaseError>;

    /// Whether any bond (active or not, any owner) other than `excluding` holds this ISIN
    async fn isin_taken(&self, isin: &str, excluding: Option<i64>) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Persistence contract for user accounts and revoked refresh tokens
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. Fails with `Conflict` when the email is taken.
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DatabaseError>;

    /// Remember `jti` until `expires_at`; entries past their expiry are pruned on write
    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DatabaseError>;

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, DatabaseError>;
}
