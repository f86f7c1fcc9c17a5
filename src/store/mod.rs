//! Document store
//!
//! JSON documents grouped in named collections, keyed by a store-assigned
//! UUID held in the top-level `id` field. Filters are plain conjunctions of
//! field equalities; there is no pagination, projection or sorting beyond
//! insertion order.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Field holding the store-assigned identifier inside every document
pub const ID_FIELD: &str = "id";

/// In-place edit applied by [`DocumentStore::modify_by_id`]. Returning an
/// error aborts the edit and leaves the stored document untouched.
pub type DocumentEdit<'a> = Box<dyn FnOnce(Value) -> Result<Value, ApiError> + Send + 'a>;

/// Equality filter over top-level document fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Map<String, Value>,
}

impl Filter {
    /// Matches every document in a collection
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq<V: Into<Value>>(field: &str, value: V) -> Self {
        Self::all().and(field, value)
    }

    pub fn and<V: Into<Value>>(mut self, field: &str, value: V) -> Self {
        self.conditions.insert(field.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// Filter as a JSON object, suitable for JSONB containment
    pub fn to_json(&self) -> Value {
        Value::Object(self.conditions.clone())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return it with its assigned `id`.
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, ApiError>;

    /// Insert a batch; either every document is stored or none is.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<Value>, ApiError>;

    async fn find_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<Value>, ApiError>;

    /// Documents matching `filter`, in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, ApiError>;

    /// Replace a whole document. Returns `None` if no document has this id.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        document: Value,
    ) -> Result<Option<Value>, ApiError>;

    /// Read, edit and replace one document as a single atomic step; no other
    /// write to that document can interleave. Returns `None` if no document
    /// has this id.
    async fn modify_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        edit: DocumentEdit<'_>,
    ) -> Result<Option<Value>, ApiError>;

    /// Returns whether a document was removed.
    async fn delete_by_id(&self, collection: &str, id: &Uuid) -> Result<bool, ApiError>;

    /// Returns the number of removed documents.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, ApiError>;

    /// Connectivity check used by the health endpoints
    async fn ping(&self) -> Result<(), ApiError>;

    /// Release the underlying connection, if any
    async fn close(&self) {}
}

/// Serialize a record into a storable JSON object.
pub fn to_document<T: Serialize>(record: &T) -> Result<Value, ApiError> {
    let value = serde_json::to_value(record)?;
    if !value.is_object() {
        return Err(ApiError::internal("documents must serialize to JSON objects"));
    }
    Ok(value)
}

pub fn from_document<T: DeserializeOwned>(document: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(document)?)
}

/// Stamp `id` into a document object, replacing any caller-provided value.
pub(crate) fn with_id(mut document: Value, id: Uuid) -> Result<Value, ApiError> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| ApiError::internal("documents must be JSON objects"))?;
    object.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    Ok(document)
}
