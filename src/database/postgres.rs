use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Bond, BondDraft, User};
use crate::database::store::{BondStore, UserStore};

const BOND_COLUMNS: &str = "id, user_id, name, isin, value, interest_rate, purchase_date, maturity_date, \
     interest_payment_frequency, is_active, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, email, password_hash, is_active, is_admin, last_login, created_at, updated_at";

pub struct PgBondStore {
    pool: PgPool,
}

impl PgBondStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found(id: i64) -> DatabaseError {
        DatabaseError::NotFound(format!("Bond {} not found", id))
    }
}

#[async_trait]
impl BondStore for PgBondStore {
    async fn list_active(&self, user_id: Uuid) -> Result<Vec<Bond>, DatabaseError> {
        let sql = format!("SELECT {} FROM bonds WHERE user_id = $1 AND is_active = true", BOND_COLUMNS);
        let bonds = sqlx::query_as::<_, Bond>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(bonds)
    }

    async fn get_active(&self, user_id: Uuid, id: i64) -> Result<Option<Bond>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM bonds WHERE id = $1 AND user_id = $2 AND is_active = true",
            BOND_COLUMNS
        );
        let bond = sqlx::query_as::<_, Bond>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bond)
    }

    async fn get_owned(&self, user_id: Uuid, id: i64) -> Result<Option<Bond>, DatabaseError> {
        let sql = format!("SELECT {} FROM bonds WHERE id = $1 AND user_id = $2", BOND_COLUMNS);
        let bond = sqlx::query_as::<_, Bond>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bond)
    }

    async fn create(&self, user_id: Uuid, draft: BondDraft) -> Result<Bond, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO bonds
                (user_id, name, isin, value, interest_rate, purchase_date, maturity_date,
                 interest_payment_frequency, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, now(), now())
            RETURNING {}
            "#,
            BOND_COLUMNS
        );
        let bond = sqlx::query_as::<_, Bond>(&sql)
            .bind(user_id)
            .bind(&draft.name)
            .bind(&draft.isin)
            .bind(draft.value)
            .bind(draft.interest_rate)
            .bind(draft.purchase_date)
            .bind(draft.maturity_date)
            .bind(&draft.interest_payment_frequency)
            .fetch_one(&self.pool)
            .await?;
        Ok(bond)
    }

    async fn update(&self, user_id: Uuid, id: i64, draft: BondDraft) -> Result<Bond, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE bonds SET
                name = $3, isin = $4, value = $5, interest_rate = $6,
                purchase_date = $7, maturity_date = $8, interest_payment_frequency = $9,
                updated_at = now()
            WHERE id = $1 AND user_id = $2 AND is_active = true
            RETURNING {}
            "#,
            BOND_COLUMNS
        );
        sqlx::query_as::<_, Bond>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(&draft.name)
            .bind(&draft.isin)
            .bind(draft.value)
            .bind(draft.interest_rate)
            .bind(draft.purchase_date)
            .bind(draft.maturity_date)
            .bind(&draft.interest_payment_frequency)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn deactivate(&self, user_id: Uuid, id: i64) -> Result<Bond, DatabaseError> {
        let sql = format!(
            "UPDATE bonds SET is_active = false, updated_at = now() \
             WHERE id = $1 AND user_id = $2 AND is_active = true RETURNING {}",
            BOND_COLUMNS
        );
        sqlx::query_as::<_, Bond>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn purge(&self, user_id: Uuid, id: i64) -> Result<Bond, DatabaseError> {
        let sql = format!("DELETE FROM bonds WHERE id = $1 AND user_id = $2 RETURNING {}", BOND_COLUMNS);
        sqlx::query_as::<_, Bond>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn isin_taken(&self, isin: &str, excluding: Option<i64>) -> Result<bool, DatabaseError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM bonds WHERE isin = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(isin)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0 > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, password_hash, is_active, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, true, false, now(), now())
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM revoked_tokens WHERE jti = $1")
            .bind(jti)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0 > 0)
    }
}
