use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{NewUser, PhotoUpdate, ProfileType, User, UserCreate, UserUpdate, MIN_PASSWORD_LEN},
    repositories::UserRepository,
    utils::{hash_password, normalize_email, required_text, verify_password},
};

pub struct UserService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
}

fn check_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { user_repo }
    }

    async fn ensure_email_available(&self, email: &str, current: Option<&Uuid>) -> Result<(), ApiError> {
        if let Some(existing) = self.user_repo.get_by_email(email).await? {
            if Some(&existing.id) != current {
                return Err(ApiError::validation(format!(
                    "Email '{}' is already registered",
                    email
                )));
            }
        }
        Ok(())
    }

    pub async fn create(&self, payload: UserCreate) -> Result<User, ApiError> {
        let name = required_text(payload.name, "Name")?;
        let email = normalize_email(&required_text(payload.email, "Email")?)?;
        let password = payload
            .password
            .ok_or_else(|| ApiError::validation("Password is required"))?;
        check_password(&password)?;
        let profile_type = payload
            .profile_type
            .as_deref()
            .map(str::parse::<ProfileType>)
            .transpose()?
            .unwrap_or_default();

        self.ensure_email_available(&email, None).await?;

        let now = Utc::now();
        let record = self
            .user_repo
            .create(&NewUser {
                name,
                email,
                password_hash: hash_password(&password)?,
                profile_type,
                photo: payload.photo,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::info!(user_id = %record.id, profile_type = %record.profile_type, "user created");
        Ok(record.into())
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self
            .user_repo
            .list()
            .await?
            .into_iter()
            .map(User::from)
            .collect())
    }

    pub async fn get_by_id(&self, id: &Uuid) -> Result<User, ApiError> {
        self.user_repo
            .get_by_id(id)
            .await?
            .map(User::from)
            .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))
    }

    pub async fn list_by_profile(&self, profile_type: &str) -> Result<Vec<User>, ApiError> {
        let profile: ProfileType = profile_type.parse()?;
        Ok(self
            .user_repo
            .list_by_profile(profile)
            .await?
            .into_iter()
            .map(User::from)
            .collect())
    }

    pub async fn update(&self, id: &Uuid, update: UserUpdate) -> Result<User, ApiError> {
        let mut record = self
            .user_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

        if let Some(name) = update.name {
            record.name = required_text(Some(name), "Name")?;
        }
        if let Some(email) = update.email {
            let email = normalize_email(&email)?;
            self.ensure_email_available(&email, Some(id)).await?;
            record.email = email;
        }
        if let Some(password) = update.password {
            check_password(&password)?;
            // Same password: keep the existing hash
            if !verify_password(&password, &record.password_hash)? {
                record.password_hash = hash_password(&password)?;
            }
        }
        if let Some(profile_type) = update.profile_type {
            record.profile_type = profile_type.parse()?;
        }
        if update.photo.is_some() {
            record.photo = update.photo;
        }
        record.touch();

        let saved = self.user_repo.save(&record).await?;
        tracing::info!(user_id = %saved.id, "user updated");
        Ok(saved.into())
    }

    pub async fn update_photo(&self, id: &Uuid, update: PhotoUpdate) -> Result<User, ApiError> {
        let photo = required_text(update.photo, "Photo")?;
        let mut record = self
            .user_repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;

        record.photo = Some(photo);
        record.touch();

        let saved = self.user_repo.save(&record).await?;
        tracing::info!(user_id = %saved.id, "user photo updated");
        Ok(saved.into())
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), ApiError> {
        self.user_repo.delete(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}
