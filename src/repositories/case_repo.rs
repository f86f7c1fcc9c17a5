use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Case, CaseStatus, NewCase},
    store::{from_document, to_document, DocumentStore, Filter},
};

pub const CASE_COLLECTION: &str = "cases";

#[async_trait]
pub trait CaseRepository: Send + Sync {
    async fn create(&self, case: &NewCase) -> Result<Case, ApiError>;
    async fn list(&self) -> Result<Vec<Case>, ApiError>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Case>, ApiError>;
    /// Lookup by the numeric case number evidence refers to.
    async fn get_by_case_id(&self, case_id: i64) -> Result<Option<Case>, ApiError>;
    async fn list_by_status(&self, status: CaseStatus) -> Result<Vec<Case>, ApiError>;
    async fn list_by_responsible_and_status(
        &self,
        responsible_id: &Uuid,
        status: CaseStatus,
    ) -> Result<Vec<Case>, ApiError>;
    async fn save(&self, case: &Case) -> Result<Case, ApiError>;
    async fn delete(&self, id: &Uuid) -> Result<(), ApiError>;
}

pub struct StoreCaseRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreCaseRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Case>, ApiError> {
        self.store
            .find(CASE_COLLECTION, filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }
}

#[async_trait]
impl CaseRepository for StoreCaseRepository {
    async fn create(&self, case: &NewCase) -> Result<Case, ApiError> {
        let stored = self
            .store
            .insert(CASE_COLLECTION, to_document(case)?)
            .await?;
        from_document(stored)
    }

    async fn list(&self) -> Result<Vec<Case>, ApiError> {
        self.find(&Filter::all()).await
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<Case>, ApiError> {
        self.store
            .find_by_id(CASE_COLLECTION, id)
            .await?
            .map(from_document)
            .transpose()
    }

    async fn get_by_case_id(&self, case_id: i64) -> Result<Option<Case>, ApiError> {
        Ok(self
            .find(&Filter::eq("caseId", case_id))
            .await?
            .into_iter()
            .next())
    }

    async fn list_by_status(&self, status: CaseStatus) -> Result<Vec<Case>, ApiError> {
        self.find(&Filter::eq("status", status.as_str())).await
    }

    async fn list_by_responsible_and_status(
        &self,
        responsible_id: &Uuid,
        status: CaseStatus,
    ) -> Result<Vec<Case>, ApiError> {
        let filter = Filter::eq("responsibleId", responsible_id.to_string())
            .and("status", status.as_str());
        self.find(&filter).await
    }

    async fn save(&self, case: &Case) -> Result<Case, ApiError> {
        let updated = self
            .store
            .update_by_id(CASE_COLLECTION, &case.id, to_document(case)?)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Case {} not found", case.id)))?;
        from_document(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), ApiError> {
        if !self.store.delete_by_id(CASE_COLLECTION, id).await? {
            return Err(ApiError::not_found(format!("Case {} not found", id)));
        }
        Ok(())
    }
}
