//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::analysis::{AnalysisCache, MemoryCacheStore};
use crate::config::AppConfig;
use crate::database::{
    BondStore, DatabaseManager, MemoryBondStore, MemoryUserStore, PgBondStore, PgUserStore,
    UserStore,
};
use crate::services::{BondService, UserService};
use crate::validation::{ChecksumIsinVerifier, IsinVerifier, RegistryIsinVerifier};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub bonds: Arc<BondService>,
    pub users: Arc<UserService>,
    /// Used directly by the health endpoint
    pub bond_store: Arc<dyn BondStore>,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// With a database URL the Postgres stores are used (migrations applied
    /// when enabled); without one everything lives in process memory.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let verifier: Arc<dyn IsinVerifier> = if config.isin.registry_lookup {
            tracing::info!("Verifying ISINs against {}", config.isin.registry_url);
            Arc::new(RegistryIsinVerifier::new(&config.isin)?)
        } else {
            Arc::new(ChecksumIsinVerifier)
        };

        if config.database.url.is_none() {
            tracing::warn!("DATABASE_URL not set, using in-memory stores");
            return Ok(Self::assemble(
                config.clone(),
                Arc::new(MemoryBondStore::new()),
                Arc::new(MemoryUserStore::new()),
                verifier,
            ));
        }

        let db = DatabaseManager::connect(&config.database).await?;
        if config.database.run_migrations {
            db.migrate().await?;
        }

        Ok(Self::assemble(
            config.clone(),
            Arc::new(PgBondStore::new(db.pool().clone())),
            Arc::new(PgUserStore::new(db.pool().clone())),
            verifier,
        ))
    }

    /// In-memory stores with offline ISIN checks
    pub fn in_memory(config: AppConfig) -> Self {
        Self::assemble(
            config,
            Arc::new(MemoryBondStore::new()),
            Arc::new(MemoryUserStore::new()),
            Arc::new(ChecksumIsinVerifier),
        )
    }

    pub fn assemble(
        config: AppConfig,
        bond_store: Arc<dyn BondStore>,
        user_store: Arc<dyn UserStore>,
        verifier: Arc<dyn IsinVerifier>,
    ) -> Self {
        let analysis = if config.cache.enabled {
            AnalysisCache::new(
                Arc::new(MemoryCacheStore::new()),
                Duration::from_secs(config.cache.analysis_ttl_secs),
            )
        } else {
            AnalysisCache::disabled()
        };

        Self {
            bonds: Arc::new(BondService::new(
                Arc::clone(&bond_store),
                verifier,
                Arc::new(analysis),
            )),
            users: Arc::new(UserService::new(user_store, config.security.clone())),
            bond_store,
            config: Arc::new(config),
        }
    }
}
