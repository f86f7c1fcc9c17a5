//! Evidence Service
//!
//! Validated CRUD for evidence records and management of their three
//! embedded sub-collections (radiographs, odontograms, documents).
//!
//! Creation checks that the referenced case exists before writing. The check
//! and the write are separate store operations, so a case deleted in between
//! still ends up referenced.

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{
        AttachmentKind, DocumentAttachmentCreate, Evidence, EvidenceCreate, EvidenceUpdate,
        ImageAttachment, ImageAttachmentCreate,
    },
    repositories::{CaseRepository, EvidenceRepository},
};

/// Picks the image sub-collection a new attachment is appended to
type ImageSlot = fn(&mut Evidence) -> &mut Vec<ImageAttachment>;

pub struct EvidenceService {
    evidence_repo: Arc<dyn EvidenceRepository + Send + Sync>,
    case_repo: Arc<dyn CaseRepository + Send + Sync>,
}

impl EvidenceService {
    pub fn new(
        evidence_repo: Arc<dyn EvidenceRepository + Send + Sync>,
        case_repo: Arc<dyn CaseRepository + Send + Sync>,
    ) -> Self {
        Self {
            evidence_repo,
            case_repo,
        }
    }

    async fn ensure_case_exists(&self, case_id: i64) -> Result<(), ApiError> {
        if self.case_repo.get_by_case_id(case_id).await?.is_none() {
            return Err(ApiError::not_found(format!("Case {} not found", case_id)));
        }
        Ok(())
    }

    async fn get_existing(&self, id: &Uuid) -> Result<Evidence, ApiError> {
        self.evidence_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Evidence {} not found", id)))
    }

    // ========================================================================
    // EVIDENCE CRUD OPERATIONS
    // ========================================================================

    pub async fn create(&self, payload: EvidenceCreate) -> Result<Evidence, ApiError> {
        let new_evidence = payload.into_new_evidence(Utc::now())?;
        self.ensure_case_exists(new_evidence.case_id).await?;

        let evidence = self.evidence_repo.create(&new_evidence).await?;
        tracing::info!(evidence_id = %evidence.id, case_id = evidence.case_id, "evidence created");
        Ok(evidence)
    }

    /// All-or-nothing: every item is validated and its case checked before
    /// the batch is written in one store call.
    pub async fn create_many(&self, payloads: Vec<EvidenceCreate>) -> Result<Vec<Evidence>, ApiError> {
        if payloads.is_empty() {
            return Err(ApiError::validation(
                "At least one evidence record is required",
            ));
        }

        let now = Utc::now();
        let mut known_cases = HashSet::new();
        let mut batch = Vec::with_capacity(payloads.len());

        for (index, payload) in payloads.into_iter().enumerate() {
            let prefix = format!("Item {}", index);
            let new_evidence = payload
                .into_new_evidence(now)
                .map_err(|e| e.prefixed(&prefix))?;

            if !known_cases.contains(&new_evidence.case_id) {
                self.ensure_case_exists(new_evidence.case_id)
                    .await
                    .map_err(|e| e.prefixed(&prefix))?;
                known_cases.insert(new_evidence.case_id);
            }
            batch.push(new_evidence);
        }

        let created = self.evidence_repo.create_many(&batch).await?;
        tracing::info!(count = created.len(), "evidence batch created");
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<Evidence>, ApiError> {
        self.evidence_repo.list().await
    }

    pub async fn get_by_id(&self, id: &Uuid) -> Result<Evidence, ApiError> {
        self.get_existing(id).await
    }

    /// Empty when nothing references `case_id`; not an error.
    pub async fn list_by_case(&self, case_id: i64) -> Result<Vec<Evidence>, ApiError> {
        let evidence = self.evidence_repo.list_by_case(case_id).await?;
        tracing::debug!(case_id, count = evidence.len(), "listed evidence by case");
        Ok(evidence)
    }

    /// Overwrite only the address fields present in `update`.
    pub async fn update(&self, id: &Uuid, update: EvidenceUpdate) -> Result<Evidence, ApiError> {
        let address = update.address.trimmed();

        let saved = self
            .evidence_repo
            .modify(
                id,
                Box::new(move |evidence: &mut Evidence| {
                    evidence.address.apply(address);
                    evidence.touch();
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(evidence_id = %saved.id, "evidence updated");
        Ok(saved)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), ApiError> {
        self.evidence_repo.delete(id).await?;
        tracing::info!(evidence_id = %id, "evidence deleted");
        Ok(())
    }

    /// Remove every evidence record. Returns how many were removed.
    pub async fn delete_all(&self) -> Result<u64, ApiError> {
        let removed = self.evidence_repo.delete_all().await?;
        tracing::warn!(removed, "all evidence records deleted");
        Ok(removed)
    }

    // ========================================================================
    // SUB-COLLECTION OPERATIONS
    // ========================================================================

    pub async fn add_radiograph(
        &self,
        id: &Uuid,
        payload: ImageAttachmentCreate,
    ) -> Result<Evidence, ApiError> {
        self.add_image(id, AttachmentKind::Radiograph, |e| &mut e.radiographs, payload)
            .await
    }

    pub async fn add_odontogram(
        &self,
        id: &Uuid,
        payload: ImageAttachmentCreate,
    ) -> Result<Evidence, ApiError> {
        self.add_image(id, AttachmentKind::Odontogram, |e| &mut e.odontograms, payload)
            .await
    }

    async fn add_image(
        &self,
        id: &Uuid,
        kind: AttachmentKind,
        images: ImageSlot,
        payload: ImageAttachmentCreate,
    ) -> Result<Evidence, ApiError> {
        let attachment = payload.into_attachment(kind, Utc::now())?;
        let attachment_id = attachment.id;

        let saved = self
            .evidence_repo
            .modify(
                id,
                Box::new(move |evidence: &mut Evidence| {
                    images(evidence).push(attachment);
                    evidence.touch();
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(evidence_id = %id, %attachment_id, kind = %kind, "attachment added");
        Ok(saved)
    }

    pub async fn add_document(
        &self,
        id: &Uuid,
        payload: DocumentAttachmentCreate,
    ) -> Result<Evidence, ApiError> {
        let document = payload.into_attachment(Utc::now())?;
        let attachment_id = document.id;

        let saved = self
            .evidence_repo
            .modify(
                id,
                Box::new(move |evidence: &mut Evidence| {
                    evidence.documents.push(document);
                    evidence.touch();
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(evidence_id = %id, %attachment_id, kind = "Document", "attachment added");
        Ok(saved)
    }

    pub async fn remove_radiograph(&self, id: &Uuid, radiograph_id: &Uuid) -> Result<Evidence, ApiError> {
        self.remove_attachment(id, AttachmentKind::Radiograph, radiograph_id)
            .await
    }

    pub async fn remove_odontogram(&self, id: &Uuid, odontogram_id: &Uuid) -> Result<Evidence, ApiError> {
        self.remove_attachment(id, AttachmentKind::Odontogram, odontogram_id)
            .await
    }

    pub async fn remove_document(&self, id: &Uuid, document_id: &Uuid) -> Result<Evidence, ApiError> {
        self.remove_attachment(id, AttachmentKind::Document, document_id)
            .await
    }

    /// An unknown `attachment_id` is a no-op: the record is still persisted
    /// and `updated_at` refreshed.
    async fn remove_attachment(
        &self,
        id: &Uuid,
        kind: AttachmentKind,
        attachment_id: &Uuid,
    ) -> Result<Evidence, ApiError> {
        let mut removed = false;

        let saved = self
            .evidence_repo
            .modify(
                id,
                Box::new(|evidence: &mut Evidence| {
                    removed = evidence.remove_attachment(kind, attachment_id);
                    evidence.touch();
                    Ok(())
                }),
            )
            .await?;
        if removed {
            tracing::info!(evidence_id = %id, %attachment_id, kind = %kind, "attachment removed");
        } else {
            tracing::debug!(evidence_id = %id, %attachment_id, kind = %kind, "attachment not present, nothing removed");
        }
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseStatus, NewCase};
    use crate::repositories::{StoreCaseRepository, StoreEvidenceRepository};
    use crate::store::{DocumentStore, MemoryDocumentStore};
    use serde_json::json;

    async fn setup(case_ids: &[i64]) -> EvidenceService {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let case_repo = Arc::new(StoreCaseRepository::new(store.clone()));
        let now = Utc::now();
        for &case_id in case_ids {
            case_repo
                .create(&NewCase {
                    case_id,
                    title: format!("Case {case_id}"),
                    description: None,
                    status: CaseStatus::InProgress,
                    responsible_id: None,
                    location: None,
                    occurred_at: None,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }
        EvidenceService::new(Arc::new(StoreEvidenceRepository::new(store)), case_repo)
    }

    fn payload(value: serde_json::Value) -> EvidenceCreate {
        serde_json::from_value(value).unwrap()
    }

    fn image(data: &str) -> ImageAttachmentCreate {
        ImageAttachmentCreate {
            image: Some(data.to_string()),
            note: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_case() {
        let service = setup(&[1]).await;

        let err = service.create(payload(json!({"caseId": 2}))).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(service.list().await.unwrap().is_empty());

        let created = service
            .create(payload(json!({"caseId": 1, "street": "Elm"})))
            .await
            .unwrap();
        assert_eq!(created.address.street.as_deref(), Some("Elm"));
        assert!(created.radiographs.is_empty());
    }

    #[tokio::test]
    async fn test_create_many_is_all_or_nothing() {
        let service = setup(&[1, 2]).await;

        let err = service
            .create_many(vec![
                payload(json!({"caseId": 1})),
                payload(json!({"caseId": 3})),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m.starts_with("Item 1")));
        assert!(service.list().await.unwrap().is_empty());

        let err = service
            .create_many(vec![payload(json!({"caseId": 1, "radiographs": [{"note": "x"}]}))])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.starts_with("Item 0")));

        assert!(matches!(
            service.create_many(Vec::new()).await,
            Err(ApiError::Validation(_))
        ));

        let created = service
            .create_many(vec![
                payload(json!({"caseId": 1})),
                payload(json!({"caseId": 2})),
                payload(json!({"caseId": 1})),
            ])
            .await
            .unwrap();
        assert_eq!(created.len(), 3);
        assert_eq!(service.list_by_case(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_add_radiograph_round_trip() {
        let service = setup(&[1]).await;
        let created = service.create(payload(json!({"caseId": 1}))).await.unwrap();

        service.add_radiograph(&created.id, image("abc")).await.unwrap();

        let fetched = service.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched.radiographs.len(), 1);
        assert_eq!(fetched.radiographs[0].image, "abc");
        assert!(fetched.updated_at >= fetched.created_at);
        assert!(fetched.odontograms.is_empty());
    }

    #[tokio::test]
    async fn test_add_without_content_leaves_record_unchanged() {
        let service = setup(&[1]).await;
        let created = service.create(payload(json!({"caseId": 1}))).await.unwrap();

        let err = service
            .add_odontogram(&created.id, ImageAttachmentCreate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = service
            .add_document(&created.id, DocumentAttachmentCreate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        assert_eq!(service.get_by_id(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_add_to_missing_evidence_is_not_found() {
        let service = setup(&[1]).await;
        let err = service
            .add_radiograph(&Uuid::new_v4(), image("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_unknown_attachment_is_noop() {
        let service = setup(&[1]).await;
        let created = service.create(payload(json!({"caseId": 1}))).await.unwrap();
        let first = service.add_radiograph(&created.id, image("a")).await.unwrap();
        service.add_radiograph(&created.id, image("b")).await.unwrap();

        let after = service
            .remove_radiograph(&created.id, &Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(after.radiographs.len(), 2);

        let after = service
            .remove_radiograph(&created.id, &first.radiographs[0].id)
            .await
            .unwrap();
        assert_eq!(after.radiographs.len(), 1);
        assert_eq!(after.radiographs[0].image, "b");

        let err = service
            .remove_document(&Uuid::new_v4(), &Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_touches_only_address() {
        let service = setup(&[1]).await;
        let created = service
            .create(payload(json!({"caseId": 1, "street": "Elm", "city": "Recife"})))
            .await
            .unwrap();
        service.add_document(
            &created.id,
            DocumentAttachmentCreate {
                file: Some("JVBERi0=".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let update: EvidenceUpdate =
            serde_json::from_value(json!({"city": " Olinda ", "documents": []})).unwrap();
        let updated = service.update(&created.id, update).await.unwrap();

        assert_eq!(updated.address.street.as_deref(), Some("Elm"));
        assert_eq!(updated.address.city.as_deref(), Some("Olinda"));
        assert_eq!(updated.documents.len(), 1);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let service = setup(&[1]).await;
        let created = service.create(payload(json!({"caseId": 1}))).await.unwrap();

        service.delete(&created.id).await.unwrap();
        assert!(matches!(service.delete(&created.id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(service.get_by_id(&created.id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_all_on_empty_store() {
        let service = setup(&[1]).await;
        assert_eq!(service.delete_all().await.unwrap(), 0);

        service.create(payload(json!({"caseId": 1}))).await.unwrap();
        assert_eq!(service.delete_all().await.unwrap(), 1);
    }
}
