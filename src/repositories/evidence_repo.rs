use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Evidence, NewEvidence},
    store::{from_document, to_document, DocumentStore, Filter},
};

pub const EVIDENCE_COLLECTION: &str = "evidence";

/// Edit applied to a loaded evidence record by [`EvidenceRepository::modify`]
pub type EvidenceEdit<'a> = Box<dyn FnOnce(&mut Evidence) -> Result<(), ApiError> + Send + 'a>;

#[async_trait]
pub trait EvidenceRepository: Send + Sync {
    async fn create(&self, evidence: &NewEvidence) -> Result<Evidence, ApiError>;
    /// Store every record or none of them.
    async fn create_many(&self, evidence: &[NewEvidence]) -> Result<Vec<Evidence>, ApiError>;
    async fn list(&self) -> Result<Vec<Evidence>, ApiError>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Evidence>, ApiError>;
    async fn list_by_case(&self, case_id: i64) -> Result<Vec<Evidence>, ApiError>;
    /// Load, edit and store the record atomically. Concurrent edits of the
    /// same record are applied one after the other, never lost.
    async fn modify(&self, id: &Uuid, edit: EvidenceEdit<'_>) -> Result<Evidence, ApiError>;
    async fn delete(&self, id: &Uuid) -> Result<(), ApiError>;
    async fn delete_all(&self) -> Result<u64, ApiError>;
}

pub struct StoreEvidenceRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreEvidenceRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EvidenceRepository for StoreEvidenceRepository {
    async fn create(&self, evidence: &NewEvidence) -> Result<Evidence, ApiError> {
        let stored = self
            .store
            .insert(EVIDENCE_COLLECTION, to_document(evidence)?)
            .await?;
        from_document(stored)
    }

    async fn create_many(&self, evidence: &[NewEvidence]) -> Result<Vec<Evidence>, ApiError> {
        let documents = evidence
            .iter()
            .map(to_document)
            .collect::<Result<Vec<_>, _>>()?;

        self.store
            .insert_many(EVIDENCE_COLLECTION, documents)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    async fn list(&self) -> Result<Vec<Evidence>, ApiError> {
        self.store
            .find(EVIDENCE_COLLECTION, &Filter::all())
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Evidence>, ApiError> {
        self.store
            .find_by_id(EVIDENCE_COLLECTION, id)
            .await?
            .map(from_document)
            .transpose()
    }

    async fn list_by_case(&self, case_id: i64) -> Result<Vec<Evidence>, ApiError> {
        self.store
            .find(EVIDENCE_COLLECTION, &Filter::eq("caseId", case_id))
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    async fn modify(&self, id: &Uuid, edit: EvidenceEdit<'_>) -> Result<Evidence, ApiError> {
        let updated = self
            .store
            .modify_by_id(
                EVIDENCE_COLLECTION,
                id,
                Box::new(move |document: serde_json::Value| {
                    let mut evidence: Evidence = from_document(document)?;
                    edit(&mut evidence)?;
                    to_document(&evidence)
                }),
            )
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Evidence {} not found", id)))?;
        from_document(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), ApiError> {
        if !self.store.delete_by_id(EVIDENCE_COLLECTION, id).await? {
            return Err(ApiError::not_found(format!("Evidence {} not found", id)));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, ApiError> {
        self.store
            .delete_many(EVIDENCE_COLLECTION, &Filter::all())
            .await
    }
}
