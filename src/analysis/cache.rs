use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use super::{analyze, AnalysisResult};
use crate::database::manager::DatabaseError;
use crate::database::models::Bond;
use crate::types::WriteEvent;
use crate::valuation;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Cache payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Key-value store with per-entry expiry.
///
/// Any backend error is recoverable for callers: reads degrade to a miss and
/// deletes are best effort.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-process cache store
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Per-user cache of [`AnalysisResult`]s.
///
/// Entries live for a fixed TTL and are evicted whenever one of the user's
/// bonds is written. There is no read-through lock: concurrent misses for the
/// same user may both recompute and both store, the last store wins.
pub struct AnalysisCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    enabled: bool,
}

impl AnalysisCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            enabled: true,
        }
    }

    /// A cache that never stores anything; every read recomputes
    pub fn disabled() -> Self {
        Self {
            store: Arc::new(MemoryCacheStore::new()),
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    pub fn key(user_id: Uuid) -> String {
        format!("analysis:{}", user_id)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached analysis for `user_id`, computed from `active_bonds` on a miss
    pub async fn get_or_compute<F, Fut>(
        &self,
        user_id: Uuid,
        active_bonds: F,
    ) -> Result<AnalysisResult, DatabaseError>
    where
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<Vec<Bond>, DatabaseError>>,
    {
        self.get_or_compute_as_of(user_id, valuation::today(), active_bonds)
            .await
    }

    pub async fn get_or_compute_as_of<F, Fut>(
        &self,
        user_id: Uuid,
        as_of: NaiveDate,
        active_bonds: F,
    ) -> Result<AnalysisResult, DatabaseError>
    where
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<Vec<Bond>, DatabaseError>>,
    {
        let key = Self::key(user_id);

        if self.enabled {
            if let Some(hit) = self.lookup(&key).await {
                tracing::debug!("Analysis cache hit for {}", key);
                return Ok(hit);
            }
        }

        let bonds = active_bonds(user_id).await?;
        let result = analyze(&bonds, as_of);
        tracing::debug!("Analysis recomputed for {} over {} bonds", key, bonds.len());

        if !self.enabled {
            return Ok(result);
        }

        match self.store_result(&key, &result).await {
            Ok(stored) => Ok(stored),
            Err(e) => {
                tracing::warn!("Analysis cache write failed for {}: {}", key, e);
                Ok(result)
            }
        }
    }

    /// Evict the user's entry. Idempotent.
    pub async fn invalidate(&self, user_id: Uuid) {
        let key = Self::key(user_id);
        if let Err(e) = self.store.delete(&key).await {
            tracing::warn!("Analysis cache invalidation failed for {}: {}", key, e);
        }
    }

    /// Write-path hook: called once per committed bond write
    pub async fn on_write(&self, event: &WriteEvent) {
        tracing::debug!(
            "Bond {} {:?} by user {}, evicting analysis",
            event.bond_id,
            event.operation,
            event.user_id
        );
        self.invalidate(event.user_id).await;
    }

    async fn lookup(&self, key: &str) -> Option<AnalysisResult> {
        match self.store.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!("Discarding unreadable analysis cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Analysis cache read failed for {}, recomputing: {}", key, e);
                None
            }
        }
    }

    /// Store the result and hand back exactly what a later hit will decode
    async fn store_result(&self, key: &str, result: &AnalysisResult) -> Result<AnalysisResult, CacheError> {
        let payload = serde_json::to_string(result)?;
        let stored = serde_json::from_str(&payload)?;
        self.store.set(key, payload, self.ttl).await?;
        Ok(stored)
    }
}
