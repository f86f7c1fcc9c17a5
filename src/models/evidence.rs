use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Default `type` of an attached document
pub const DEFAULT_DOCUMENT_TYPE: &str = "PDF";
/// Default `name` of an attached document
pub const DEFAULT_DOCUMENT_NAME: &str = "Document";

/// Where the evidence was collected. Every field is optional free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl Address {
    /// Trim surrounding whitespace from every present field.
    pub fn trimmed(self) -> Self {
        fn trim(field: Option<String>) -> Option<String> {
            field.map(|value| value.trim().to_string())
        }

        Self {
            street: trim(self.street),
            neighborhood: trim(self.neighborhood),
            postal_code: trim(self.postal_code),
            number: trim(self.number),
            state: trim(self.state),
            city: trim(self.city),
        }
    }

    /// Overwrite only the fields present in `changes`.
    pub fn apply(&mut self, changes: Address) {
        let Address {
            street,
            neighborhood,
            postal_code,
            number,
            state,
            city,
        } = changes;

        if street.is_some() {
            self.street = street;
        }
        if neighborhood.is_some() {
            self.neighborhood = neighborhood;
        }
        if postal_code.is_some() {
            self.postal_code = postal_code;
        }
        if number.is_some() {
            self.number = number;
        }
        if state.is_some() {
            self.state = state;
        }
        if city.is_some() {
            self.city = city;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Address::default()
    }
}

/// Radiograph or odontogram image embedded in an evidence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub id: Uuid,
    /// Base64 payload, stored opaquely
    pub image: String,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

pub type Radiograph = ImageAttachment;
pub type Odontogram = ImageAttachment;

/// File embedded in an evidence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAttachment {
    pub id: Uuid,
    /// Base64 payload, stored opaquely
    pub file: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// The three embedded sub-collections of an evidence record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Radiograph,
    Odontogram,
    Document,
}

impl AttachmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Radiograph => "Radiograph",
            Self::Odontogram => "Odontogram",
            Self::Document => "Document",
        }
    }
}

impl std::fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: Uuid,
    pub case_id: i64,
    #[serde(flatten)]
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub radiographs: Vec<Radiograph>,
    #[serde(default)]
    pub odontograms: Vec<Odontogram>,
    #[serde(default)]
    pub documents: Vec<DocumentAttachment>,
}

impl Evidence {
    /// Refresh `updated_at`, never letting it fall behind `created_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Remove the element with `attachment_id` from the given sub-collection.
    /// Returns whether anything was removed.
    pub fn remove_attachment(&mut self, kind: AttachmentKind, attachment_id: &Uuid) -> bool {
        fn remove_by_id<T>(items: &mut Vec<T>, id_of: impl Fn(&T) -> Uuid, id: &Uuid) -> bool {
            let before = items.len();
            items.retain(|item| id_of(item) != *id);
            items.len() != before
        }

        match kind {
            AttachmentKind::Radiograph => remove_by_id(&mut self.radiographs, |r| r.id, attachment_id),
            AttachmentKind::Odontogram => remove_by_id(&mut self.odontograms, |o| o.id, attachment_id),
            AttachmentKind::Document => remove_by_id(&mut self.documents, |d| d.id, attachment_id),
        }
    }
}

/// Evidence record as handed to the store, before an id is assigned
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvidence {
    pub case_id: i64,
    #[serde(flatten)]
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub radiographs: Vec<Radiograph>,
    pub odontograms: Vec<Odontogram>,
    pub documents: Vec<DocumentAttachment>,
}

/// Payload for adding a radiograph or odontogram
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachmentCreate {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ImageAttachmentCreate {
    /// Build the stored element; the image is mandatory.
    pub fn into_attachment(
        self,
        kind: AttachmentKind,
        now: DateTime<Utc>,
    ) -> Result<ImageAttachment, ApiError> {
        let image = required_content(self.image)
            .ok_or_else(|| ApiError::validation(format!("{kind} image is required")))?;

        Ok(ImageAttachment {
            id: Uuid::new_v4(),
            image,
            note: self.note.unwrap_or_default(),
            created_at: now,
        })
    }
}

/// Payload for adding a document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAttachmentCreate {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl DocumentAttachmentCreate {
    /// Build the stored element; the file is mandatory, type and name fall back to defaults.
    pub fn into_attachment(self, now: DateTime<Utc>) -> Result<DocumentAttachment, ApiError> {
        let file = required_content(self.file)
            .ok_or_else(|| ApiError::validation("Document file is required"))?;

        Ok(DocumentAttachment {
            id: Uuid::new_v4(),
            file,
            doc_type: non_blank(self.doc_type).unwrap_or_else(|| DEFAULT_DOCUMENT_TYPE.to_string()),
            name: non_blank(self.name).unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string()),
            note: self.note.unwrap_or_default(),
            created_at: now,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// Blank payloads count as missing
fn required_content(value: Option<String>) -> Option<String> {
    non_blank(value)
}

/// Body of `POST /evidence` and of each item of `POST /evidence/bulk`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceCreate {
    pub case_id: i64,
    #[serde(flatten)]
    pub address: Address,
    #[serde(default)]
    pub radiographs: Option<Vec<ImageAttachmentCreate>>,
    #[serde(default)]
    pub odontograms: Option<Vec<ImageAttachmentCreate>>,
    #[serde(default)]
    pub documents: Option<Vec<DocumentAttachmentCreate>>,
}

impl EvidenceCreate {
    /// Validate embedded elements and stamp ids/timestamps.
    pub fn into_new_evidence(self, now: DateTime<Utc>) -> Result<NewEvidence, ApiError> {
        let radiographs = self
            .radiographs
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.into_attachment(AttachmentKind::Radiograph, now))
            .collect::<Result<Vec<_>, _>>()?;
        let odontograms = self
            .odontograms
            .unwrap_or_default()
            .into_iter()
            .map(|o| o.into_attachment(AttachmentKind::Odontogram, now))
            .collect::<Result<Vec<_>, _>>()?;
        let documents = self
            .documents
            .unwrap_or_default()
            .into_iter()
            .map(|d| d.into_attachment(now))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewEvidence {
            case_id: self.case_id,
            address: self.address.trimmed(),
            created_at: now,
            updated_at: now,
            radiographs,
            odontograms,
            documents,
        })
    }
}

/// Body of `PUT /evidence/:id`. Only address fields are accepted; anything
/// else in the body (including sub-collections) is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceUpdate {
    #[serde(flatten)]
    pub address: Address,
}
