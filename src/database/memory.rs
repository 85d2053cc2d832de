use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Bond, BondDraft, User};
use crate::database::store::{BondStore, UserStore};

/// Process-local bond store with the same constraints as the bonds table.
/// Backs development runs without DATABASE_URL and the test suites.
#[derive(Default)]
pub struct MemoryBondStore {
    bonds: Arc<RwLock<HashMap<i64, Bond>>>,
    next_id: AtomicI64,
}

impl MemoryBondStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: i64) -> DatabaseError {
        DatabaseError::NotFound(format!("Bond {} not found", id))
    }

    fn ensure_isin_free(
        bonds: &HashMap<i64, Bond>,
        isin: &str,
        excluding: Option<i64>,
    ) -> Result<(), DatabaseError> {
        let taken = bonds
            .values()
            .any(|b| b.isin == isin && Some(b.id) != excluding);
        if taken {
            return Err(DatabaseError::Conflict("bonds_isin_key".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BondStore for MemoryBondStore {
    async fn list_active(&self, user_id: Uuid) -> Result<Vec<Bond>, DatabaseError> {
        let bonds = self.bonds.read().await;
        Ok(bonds
            .values()
            .filter(|b| b.user_id == user_id && b.is_active)
            .cloned()
            .collect())
    }

    async fn get_active(&self, user_id: Uuid, id: i64) -> Result<Option<Bond>, DatabaseError> {
        let bonds = self.bonds.read().await;
        Ok(bonds
            .get(&id)
            .filter(|b| b.user_id == user_id && b.is_active)
            .cloned())
    }

    async fn get_owned(&self, user_id: Uuid, id: i64) -> Result<Option<Bond>, DatabaseError> {
        let bonds = self.bonds.read().await;
        Ok(bonds.get(&id).filter(|b| b.user_id == user_id).cloned())
    }

    async fn create(&self, user_id: Uuid, draft: BondDraft) -> Result<Bond, DatabaseError> {
        let mut bonds = self.bonds.write().await;
        Self::ensure_isin_free(&bonds, &draft.isin, None)?;

        let now = Utc::now();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let bond = Bond {
            id,
            user_id,
            name: draft.name,
            isin: draft.isin,
            value: draft.value,
            interest_rate: draft.interest_rate,
            purchase_date: draft.purchase_date,
            maturity_date: draft.maturity_date,
            interest_payment_frequency: draft.interest_payment_frequency,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        bonds.insert(id, bond.clone());
        Ok(bond)
    }

    async fn update(&self, user_id: Uuid, id: i64, draft: BondDraft) -> Result<Bond, DatabaseError> {
        let mut bonds = self.bonds.write().await;
        Self::ensure_isin_free(&bonds, &draft.isin, Some(id))?;

        let bond = bonds
            .get_mut(&id)
            .filter(|b| b.user_id == user_id && b.is_active)
            .ok_or_else(|| Self::not_found(id))?;
        bond.apply(draft, Utc::now());
        Ok(bond.clone())
    }

    async fn deactivate(&self, user_id: Uuid, id: i64) -> Result<Bond, DatabaseError> {
        let mut bonds = self.bonds.write().await;
        let bond = bonds
            .get_mut(&id)
            .filter(|b| b.user_id == user_id && b.is_active)
            .ok_or_else(|| Self::not_found(id))?;
        bond.is_active = false;
        bond.updated_at = Utc::now();
        Ok(bond.clone())
    }

    async fn purge(&self, user_id: Uuid, id: i64) -> Result<Bond, DatabaseError> {
        let mut bonds = self.bonds.write().await;
        let owned = bonds.get(&id).is_some_and(|b| b.user_id == user_id);
        if !owned {
            return Err(Self::not_found(id));
        }
        bonds.remove(&id).ok_or_else(|| Self::not_found(id))
    }

    async fn isin_taken(&self, isin: &str, excluding: Option<i64>) -> Result<bool, DatabaseError> {
        let bonds = self.bonds.read().await;
        Ok(Self::ensure_isin_free(&bonds, isin, excluding).is_err())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    /// Revoked refresh-token ids with the token's own expiry
    revoked: Arc<RwLock<HashMap<Uuid, DateTime<Utc>>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(DatabaseError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            is_admin: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&id) {
            user.last_login = Some(at);
        }
        Ok(())
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(jti, expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, DatabaseError> {
        Ok(self.revoked.read().await.contains_key(&jti))
    }
}
