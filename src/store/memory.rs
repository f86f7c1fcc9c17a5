use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{with_id, DocumentEdit, DocumentStore, Filter, ID_FIELD};
use crate::error::ApiError;

/// In-process document store.
///
/// Each collection is an insertion-ordered vector behind a single `RwLock`,
/// so every operation is atomic with respect to the others. Contents are lost
/// when the process exits.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_id(document: &Value, id: &Uuid) -> bool {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .is_some_and(|stored| stored == *id)
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, document: Value) -> Result<Value, ApiError> {
        let stored = with_id(document, Uuid::new_v4())?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Value>,
    ) -> Result<Vec<Value>, ApiError> {
        // Stamp every id before taking the lock so a bad document aborts the whole batch.
        let stored = documents
            .into_iter()
            .map(|doc| with_id(doc, Uuid::new_v4()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn find_by_id(&self, collection: &str, id: &Uuid) -> Result<Option<Value>, ApiError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| has_id(doc, id)))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>, ApiError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        document: Value,
    ) -> Result<Option<Value>, ApiError> {
        let replacement = with_id(document, *id)?;
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| has_id(doc, id)));

        Ok(slot.map(|existing| {
            *existing = replacement.clone();
            replacement
        }))
    }

    async fn modify_by_id(
        &self,
        collection: &str,
        id: &Uuid,
        edit: DocumentEdit<'_>,
    ) -> Result<Option<Value>, ApiError> {
        // The write lock is held from lookup to replacement.
        let mut collections = self.collections.write().await;
        let Some(slot) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| has_id(doc, id)))
        else {
            return Ok(None);
        };

        let replacement = with_id(edit(slot.clone())?, *id)?;
        *slot = replacement.clone();
        Ok(Some(replacement))
    }

    async fn delete_by_id(&self, collection: &str, id: &Uuid) -> Result<bool, ApiError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|doc| !has_id(doc, id));
        Ok(docs.len() != before)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, ApiError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok((before - docs.len()) as u64)
    }

    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_of(doc: &Value) -> Uuid {
        Uuid::parse_str(doc["id"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = MemoryDocumentStore::new();

        let first = store.insert("evidence", json!({"caseId": 1})).await.unwrap();
        let second = store.insert("evidence", json!({"caseId": 1})).await.unwrap();

        assert_ne!(id_of(&first), id_of(&second));
        assert_eq!(first["caseId"], 1);
    }

    #[tokio::test]
    async fn test_find_by_id_is_scoped_to_collection() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert("cases", json!({"caseId": 3})).await.unwrap();
        let id = id_of(&doc);

        assert_eq!(store.find_by_id("cases", &id).await.unwrap(), Some(doc));
        assert_eq!(store.find_by_id("evidence", &id).await.unwrap(), None);
        assert_eq!(store.find_by_id("cases", &Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = MemoryDocumentStore::new();
        for n in 0..5 {
            store
                .insert("evidence", json!({"caseId": n % 2, "n": n}))
                .await
                .unwrap();
        }

        let odd = store.find("evidence", &Filter::eq("caseId", 1)).await.unwrap();
        let ns: Vec<_> = odd.iter().map(|d| d["n"].as_i64().unwrap()).collect();
        assert_eq!(ns, vec![1, 3]);

        assert_eq!(store.find("evidence", &Filter::all()).await.unwrap().len(), 5);
        assert!(store.find("unknown", &Filter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_document_and_keeps_id() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert("users", json!({"name": "Ana"})).await.unwrap();
        let id = id_of(&doc);

        let updated = store
            .update_by_id("users", &id, json!({"name": "Ana Lima"}))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated["name"], "Ana Lima");
        assert_eq!(id_of(&updated), id);
        assert_eq!(store.find_by_id("users", &id).await.unwrap(), Some(updated));

        let missing = store
            .update_by_id("users", &Uuid::new_v4(), json!({"name": "x"}))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_modify_applies_edit_in_place() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert("evidence", json!({"tags": []})).await.unwrap();
        let id = id_of(&doc);

        let edited = store
            .modify_by_id(
                "evidence",
                &id,
                Box::new(|mut doc: Value| {
                    doc["tags"] = json!(["a"]);
                    doc["id"] = json!("overwritten");
                    Ok(doc)
                }),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(edited["tags"], json!(["a"]));
        assert_eq!(id_of(&edited), id);

        let missing = store
            .modify_by_id("evidence", &Uuid::new_v4(), Box::new(|doc: Value| Ok(doc)))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_failed_modify_leaves_document_unchanged() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert("evidence", json!({"caseId": 1})).await.unwrap();
        let id = id_of(&doc);

        let result = store
            .modify_by_id(
                "evidence",
                &id,
                Box::new(|_: Value| Err(ApiError::validation("rejected"))),
            )
            .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert_eq!(store.find_by_id("evidence", &id).await.unwrap(), Some(doc));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_modifications_are_not_lost() {
        let store = std::sync::Arc::new(MemoryDocumentStore::new());
        let doc = store.insert("evidence", json!({"items": []})).await.unwrap();
        let id = id_of(&doc);

        let handles: Vec<_> = (0..32)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .modify_by_id(
                            "evidence",
                            &id,
                            Box::new(move |mut doc: Value| {
                                if let Some(items) = doc["items"].as_array_mut() {
                                    items.push(json!(n));
                                }
                                Ok(doc)
                            }),
                        )
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.find_by_id("evidence", &id).await.unwrap().unwrap();
        assert_eq!(stored["items"].as_array().unwrap().len(), 32);
    }

    #[tokio::test]
    async fn test_delete_by_id_and_delete_many() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert("evidence", json!({"caseId": 1})).await.unwrap();
        store.insert("evidence", json!({"caseId": 2})).await.unwrap();
        store.insert("evidence", json!({"caseId": 2})).await.unwrap();

        assert!(store.delete_by_id("evidence", &id_of(&doc)).await.unwrap());
        assert!(!store.delete_by_id("evidence", &id_of(&doc)).await.unwrap());

        assert_eq!(store.delete_many("evidence", &Filter::eq("caseId", 2)).await.unwrap(), 2);
        assert_eq!(store.delete_many("evidence", &Filter::all()).await.unwrap(), 0);
        assert_eq!(store.delete_many("never-used", &Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let store = MemoryDocumentStore::new();

        let result = store
            .insert_many("evidence", vec![json!({"caseId": 1}), json!("not an object")])
            .await;
        assert!(result.is_err());
        assert!(store.find("evidence", &Filter::all()).await.unwrap().is_empty());

        let stored = store
            .insert_many("evidence", vec![json!({"caseId": 1}), json!({"caseId": 2})])
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(store.find("evidence", &Filter::all()).await.unwrap(), stored);
    }
}
