use std::sync::Arc;

use uuid::Uuid;

use crate::analysis::{AnalysisCache, AnalysisResult};
use crate::database::manager::DatabaseError;
use crate::database::models::{Bond, BondDraft};
use crate::database::store::BondStore;
use crate::types::{Operation, WriteEvent};
use crate::validation::{BondPayload, IsinError, IsinVerifier, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum BondServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("ISIN rejected: {0}")]
    Isin(#[from] IsinError),
    #[error("Bond {0} not found")]
    NotFound(i64),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Owner-scoped bond operations.
///
/// Every write runs validation, ISIN verification and the uniqueness check
/// before touching the store, then evicts the owner's cached analysis before
/// returning.
pub struct BondService {
    store: Arc<dyn BondStore>,
    verifier: Arc<dyn IsinVerifier>,
    analysis: Arc<AnalysisCache>,
}

impl BondService {
    pub fn new(
        store: Arc<dyn BondStore>,
        verifier: Arc<dyn IsinVerifier>,
        analysis: Arc<AnalysisCache>,
    ) -> Self {
        Self {
            store,
            verifier,
            analysis,
        }
    }

    /// Active bonds of the user, ordered by id
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Bond>, BondServiceError> {
        let mut bonds = self.store.list_active(user_id).await?;
        bonds.sort_by_key(|b| b.id);
        Ok(bonds)
    }

    pub async fn retrieve(&self, user_id: Uuid, id: i64) -> Result<Bond, BondServiceError> {
        self.store
            .get_active(user_id, id)
            .await?
            .ok_or(BondServiceError::NotFound(id))
    }

    pub async fn create(&self, user_id: Uuid, payload: BondPayload) -> Result<Bond, BondServiceError> {
        let draft = payload.validate()?;
        self.check_isin(&draft, None).await?;

        let bond = self.store.create(user_id, draft).await?;
        tracing::info!("User ID: {}, created Bond ID: {}", user_id, bond.id);

        self.committed(user_id, bond.id, Operation::Create).await;
        Ok(bond)
    }

    /// Full update: every writable field must be present
    pub async fn update(
        &self,
        user_id: Uuid,
        id: i64,
        payload: BondPayload,
    ) -> Result<Bond, BondServiceError> {
        let existing = self.retrieve(user_id, id).await?;
        self.replace(user_id, &existing, payload).await
    }

    /// Partial update: the patch is merged over the stored record, then the
    /// result is validated as a whole
    pub async fn partial_update(
        &self,
        user_id: Uuid,
        id: i64,
        patch: BondPayload,
    ) -> Result<Bond, BondServiceError> {
        let existing = self.retrieve(user_id, id).await?;
        let merged = BondPayload::from_bond(&existing).merge(patch);
        self.replace(user_id, &existing, merged).await
    }

    /// Soft delete
    pub async fn deactivate(&self, user_id: Uuid, id: i64) -> Result<Bond, BondServiceError> {
        let bond = self.store.deactivate(user_id, id).await.map_err(|e| not_found_as(e, id))?;
        tracing::info!("User ID: {}, deactivated Bond ID: {}", user_id, bond.id);

        self.committed(user_id, bond.id, Operation::Deactivate).await;
        Ok(bond)
    }

    /// Forced delete, also applies to already deactivated bonds
    pub async fn purge(&self, user_id: Uuid, id: i64) -> Result<Bond, BondServiceError> {
        let bond = self.store.purge(user_id, id).await.map_err(|e| not_found_as(e, id))?;
        tracing::info!("User ID: {}, purged Bond ID: {}", user_id, bond.id);

        self.committed(user_id, bond.id, Operation::Purge).await;
        Ok(bond)
    }

    pub async fn analysis(&self, user_id: Uuid) -> Result<AnalysisResult, BondServiceError> {
        let store = Arc::clone(&self.store);
        let result = self
            .analysis
            .get_or_compute(user_id, move |owner| async move { store.list_active(owner).await })
            .await?;
        Ok(result)
    }

    async fn replace(
        &self,
        user_id: Uuid,
        existing: &Bond,
        payload: BondPayload,
    ) -> Result<Bond, BondServiceError> {
        let draft = payload.validate()?;
        if draft.isin != existing.isin {
            self.check_isin(&draft, Some(existing.id)).await?;
        }

        let bond = self
            .store
            .update(user_id, existing.id, draft)
            .await
            .map_err(|e| not_found_as(e, existing.id))?;
        tracing::debug!("User ID: {}, updated Bond ID: {}", user_id, bond.id);

        self.committed(user_id, bond.id, Operation::Update).await;
        Ok(bond)
    }

    async fn check_isin(&self, draft: &BondDraft, excluding: Option<i64>) -> Result<(), BondServiceError> {
        self.verifier.verify(&draft.isin).await?;

        if self.store.isin_taken(&draft.isin, excluding).await? {
            return Err(ValidationErrors::single("isin", "bond with this isin already exists.").into());
        }
        Ok(())
    }

    async fn committed(&self, user_id: Uuid, bond_id: i64, operation: Operation) {
        self.analysis
            .on_write(&WriteEvent::new(user_id, bond_id, operation))
            .await;
    }
}

fn not_found_as(err: DatabaseError, id: i64) -> BondServiceError {
    match err {
        DatabaseError::NotFound(_) => BondServiceError::NotFound(id),
        other => BondServiceError::Database(other),
    }
}
