use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    InProgress,
    Finalized,
    Archived,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::InProgress => "in_progress",
            CaseStatus::Finalized => "finalized",
            CaseStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in_progress" => Ok(CaseStatus::InProgress),
            "finalized" => Ok(CaseStatus::Finalized),
            "archived" => Ok(CaseStatus::Archived),
            other => Err(ApiError::validation(format!(
                "Invalid case status '{other}'; expected one of: in_progress, finalized, archived"
            ))),
        }
    }
}

/// Investigation record; evidence refers to it through `case_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: Uuid,
    pub case_id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Case as handed to the store, before an id is assigned
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub case_id: i64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: CaseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseCreate {
    pub case_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub responsible_id: Option<Uuid>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl CaseCreate {
    /// Check field-level rules. Reference checks (unique case id, responsible
    /// user) are left to the service.
    pub fn into_new_case(self, now: DateTime<Utc>) -> Result<NewCase, ApiError> {
        if self.case_id <= 0 {
            return Err(ApiError::validation("caseId must be a positive integer"));
        }
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::validation("Case title is required"))?;
        let status = self
            .status
            .as_deref()
            .map(str::parse::<CaseStatus>)
            .transpose()?
            .unwrap_or_default();

        Ok(NewCase {
            case_id: self.case_id,
            title,
            description: self.description,
            status,
            responsible_id: self.responsible_id,
            location: self.location,
            occurred_at: self.occurred_at,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update; `caseId` cannot be changed and is ignored if present.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub responsible_id: Option<Uuid>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl Case {
    /// Apply an update in place. The caller refreshes `updated_at` once persisted.
    pub fn apply(&mut self, update: CaseUpdate) -> Result<(), ApiError> {
        if let Some(title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(ApiError::validation("Case title cannot be empty"));
            }
            self.title = title.to_string();
        }
        if let Some(status) = update.status {
            self.status = status.parse()?;
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if update.responsible_id.is_some() {
            self.responsible_id = update.responsible_id;
        }
        if update.location.is_some() {
            self.location = update.location;
        }
        if update.occurred_at.is_some() {
            self.occurred_at = update.occurred_at;
        }
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }
}
