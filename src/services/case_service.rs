use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Case, CaseCreate, CaseStatus, CaseUpdate},
    repositories::{CaseRepository, UserRepository},
};

pub struct CaseService {
    case_repo: Arc<dyn CaseRepository + Send + Sync>,
    user_repo: Arc<dyn UserRepository + Send + Sync>,
}

impl CaseService {
    pub fn new(
        case_repo: Arc<dyn CaseRepository + Send + Sync>,
        user_repo: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self {
            case_repo,
            user_repo,
        }
    }

    async fn ensure_responsible_exists(&self, responsible_id: Option<&Uuid>) -> Result<(), ApiError> {
        if let Some(user_id) = responsible_id {
            if self.user_repo.get_by_id(user_id).await?.is_none() {
                return Err(ApiError::validation(format!(
                    "Responsible user {} does not exist",
                    user_id
                )));
            }
        }
        Ok(())
    }

    pub async fn create(&self, payload: CaseCreate) -> Result<Case, ApiError> {
        let new_case = payload.into_new_case(Utc::now())?;

        if self.case_repo.get_by_case_id(new_case.case_id).await?.is_some() {
            return Err(ApiError::validation(format!(
                "Case with caseId {} already exists",
                new_case.case_id
            )));
        }
        self.ensure_responsible_exists(new_case.responsible_id.as_ref())
            .await?;

        let case = self.case_repo.create(&new_case).await?;
        tracing::info!(id = %case.id, case_id = case.case_id, "case created");
        Ok(case)
    }

    pub async fn list(&self) -> Result<Vec<Case>, ApiError> {
        self.case_repo.list().await
    }

    pub async fn get_by_id(&self, id: &Uuid) -> Result<Case, ApiError> {
        self.case_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Case {} not found", id)))
    }

    pub async fn list_by_status(&self, status: &str) -> Result<Vec<Case>, ApiError> {
        let status: CaseStatus = status.parse()?;
        self.case_repo.list_by_status(status).await
    }

    pub async fn list_by_responsible_and_status(
        &self,
        responsible_id: &Uuid,
        status: &str,
    ) -> Result<Vec<Case>, ApiError> {
        let status: CaseStatus = status.parse()?;
        self.case_repo
            .list_by_responsible_and_status(responsible_id, status)
            .await
    }

    pub async fn update(&self, id: &Uuid, update: CaseUpdate) -> Result<Case, ApiError> {
        let mut case = self.get_by_id(id).await?;

        self.ensure_responsible_exists(update.responsible_id.as_ref())
            .await?;
        case.apply(update)?;
        case.touch();

        let saved = self.case_repo.save(&case).await?;
        tracing::info!(id = %saved.id, "case updated");
        Ok(saved)
    }

    /// Evidence referencing the case is left in place.
    pub async fn delete(&self, id: &Uuid) -> Result<(), ApiError> {
        self.case_repo.delete(id).await?;
        tracing::info!(id = %id, "case deleted");
        Ok(())
    }
}
