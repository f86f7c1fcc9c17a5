use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{NewUser, ProfileType, UserRecord},
    store::{from_document, to_document, DocumentStore, Filter},
};

pub const USER_COLLECTION: &str = "users";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<UserRecord, ApiError>;
    async fn list(&self) -> Result<Vec<UserRecord>, ApiError>;
    async fn get_by_id(&self, id: &Uuid) -> Result<Option<UserRecord>, ApiError>;
    /// `email` is expected in its stored, lowercase form.
    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, ApiError>;
    async fn list_by_profile(&self, profile: ProfileType) -> Result<Vec<UserRecord>, ApiError>;
    async fn save(&self, user: &UserRecord) -> Result<UserRecord, ApiError>;
    async fn delete(&self, id: &Uuid) -> Result<(), ApiError>;
}

pub struct StoreUserRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<UserRecord>, ApiError> {
        self.store
            .find(USER_COLLECTION, filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn create(&self, user: &NewUser) -> Result<UserRecord, ApiError> {
        let stored = self
            .store
            .insert(USER_COLLECTION, to_document(user)?)
            .await?;
        from_document(stored)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, ApiError> {
        self.find(&Filter::all()).await
    }

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<UserRecord>, ApiError> {
        self.store
            .find_by_id(USER_COLLECTION, id)
            .await?
            .map(from_document)
            .transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>, ApiError> {
        Ok(self
            .find(&Filter::eq("email", email))
            .await?
            .into_iter()
            .next())
    }

    async fn list_by_profile(&self, profile: ProfileType) -> Result<Vec<UserRecord>, ApiError> {
        self.find(&Filter::eq("profileType", profile.as_str())).await
    }

    async fn save(&self, user: &UserRecord) -> Result<UserRecord, ApiError> {
        let updated = self
            .store
            .update_by_id(USER_COLLECTION, &user.id, to_document(user)?)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User {} not found", user.id)))?;
        from_document(updated)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), ApiError> {
        if !self.store.delete_by_id(USER_COLLECTION, id).await? {
            return Err(ApiError::not_found(format!("User {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;
    use chrono::Utc;

    fn new_user(email: &str, profile_type: ProfileType) -> NewUser {
        let now = Utc::now();
        NewUser {
            name: "Ana".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            profile_type,
            photo: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_by_email_and_profile() {
        let repo = StoreUserRepository::new(Arc::new(MemoryDocumentStore::new()));
        let ana = repo
            .create(&new_user("ana@example.com", ProfileType::Expert))
            .await
            .unwrap();
        repo.create(&new_user("bia@example.com", ProfileType::Admin))
            .await
            .unwrap();

        assert_eq!(repo.get_by_email("ana@example.com").await.unwrap(), Some(ana));
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
        assert_eq!(repo.list_by_profile(ProfileType::Admin).await.unwrap().len(), 1);
        assert!(repo
            .list_by_profile(ProfileType::Assistant)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_save_keeps_password_hash() {
        let repo = StoreUserRepository::new(Arc::new(MemoryDocumentStore::new()));
        let mut user = repo
            .create(&new_user("ana@example.com", ProfileType::Assistant))
            .await
            .unwrap();

        user.photo = Some("aGVsbG8=".to_string());
        let saved = repo.save(&user).await.unwrap();
        assert_eq!(saved.password_hash, "hash");
        assert_eq!(saved.photo.as_deref(), Some("aGVsbG8="));

        repo.delete(&user.id).await.unwrap();
        assert!(repo.get_by_id(&user.id).await.unwrap().is_none());
    }
}
