//! In-process document store.
//!
//! Collections hold schemaless JSON objects keyed by a store-generated id.
//! All state lives behind a single `RwLock`, so a batch delete spanning
//! several collections is one atomic unit, and unique indexes are checked
//! under the same lock that applies the write: there is no window between
//! an existence check and the insert it guards.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// A document's fields. The store injects the id under `_id` on reads.
pub type JsonMap = serde_json::Map<String, Value>;

/// One delete in an atomic batch. `ByField` variants resolve their matches
/// under the same write lock that removes them.
#[derive(Debug, Clone)]
pub enum DeleteSpec {
    /// Delete a single document by id.
    ById { collection: String, id: String },
    /// Delete every document whose top-level `field` equals `value`.
    ByField {
        collection: String,
        field: String,
        value: Value,
    },
    /// Delete every document whose top-level `field` is in `values`.
    ByFieldIn {
        collection: String,
        field: String,
        values: Vec<Value>,
    },
}

impl DeleteSpec {
    pub fn by_id(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ById {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn by_field(
        collection: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self::ByField {
            collection: collection.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}

struct UniqueIndex {
    fields: Vec<String>,
    /// Composite key -> document id.
    keys: HashMap<String, String>,
}

impl UniqueIndex {
    fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            keys: HashMap::new(),
        }
    }

    /// Composite key for a document, or None when any indexed field is
    /// missing or null (such documents are not indexed).
    fn key_for(&self, fields: &JsonMap) -> Option<String> {
        let mut parts = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            match fields.get(field) {
                Some(Value::Null) | None => return None,
                Some(value) => parts.push(value.clone()),
            }
        }
        Some(Value::Array(parts).to_string())
    }

    fn describe(&self) -> String {
        self.fields.join("+")
    }
}

#[derive(Default)]
struct Collection {
    docs: HashMap<String, JsonMap>,
    indexes: Vec<UniqueIndex>,
}

impl Collection {
    /// Check every index for a collision with another document.
    fn check_unique(&self, name: &str, doc_id: &str, fields: &JsonMap) -> StoreResult<()> {
        for index in &self.indexes {
            if let Some(key) = index.key_for(fields) {
                if let Some(existing) = index.keys.get(&key) {
                    if existing != doc_id {
                        return Err(StoreError::unique_violation(format!(
                            "{}.{} already has {}",
                            name,
                            index.describe(),
                            key
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn index_insert(&mut self, doc_id: &str, fields: &JsonMap) {
        for index in &mut self.indexes {
            if let Some(key) = index.key_for(fields) {
                index.keys.insert(key, doc_id.to_string());
            }
        }
    }

    fn index_remove(&mut self, fields: &JsonMap) {
        for index in &mut self.indexes {
            if let Some(key) = index.key_for(fields) {
                index.keys.remove(&key);
            }
        }
    }

    fn remove_doc(&mut self, id: &str) -> bool {
        match self.docs.remove(id) {
            Some(fields) => {
                self.index_remove(&fields);
                true
            }
            None => false,
        }
    }
}

fn with_id(id: &str, fields: &JsonMap) -> JsonMap {
    let mut out = fields.clone();
    out.insert("_id".to_string(), Value::String(id.to_string()));
    out
}

/// Explicitly constructed store handle. Create one at process start, share
/// it via `Arc`, and pass it into each component.
pub struct DocumentStore {
    inner: RwLock<HashMap<String, Collection>>,
}

/// Builder declaring collections and their unique indexes up front.
#[derive(Default)]
pub struct DocumentStoreBuilder {
    indexes: Vec<(String, Vec<String>)>,
}

impl DocumentStoreBuilder {
    /// Declare a unique index over the given top-level fields.
    pub fn unique_index(mut self, collection: &str, fields: &[&str]) -> Self {
        self.indexes.push((
            collection.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        ));
        self
    }

    pub fn build(self) -> DocumentStore {
        let mut map: HashMap<String, Collection> = HashMap::new();
        for (collection, fields) in self.indexes {
            let refs: Vec<&str> = fields.iter().map(|s| s.as_str()).collect();
            map.entry(collection)
                .or_default()
                .indexes
                .push(UniqueIndex::new(&refs));
        }
        DocumentStore {
            inner: RwLock::new(map),
        }
    }
}

impl DocumentStore {
    pub fn builder() -> DocumentStoreBuilder {
        DocumentStoreBuilder::default()
    }

    /// Insert a document, assigning a fresh id. Unique indexes are checked
    /// and updated under the write lock; a collision fails the insert with
    /// `UniqueViolation` and changes nothing.
    pub async fn insert(&self, collection: &str, mut fields: JsonMap) -> StoreResult<String> {
        fields.remove("_id");
        let id = Uuid::new_v4().to_string();

        let mut inner = self.inner.write().await;
        let coll = inner.entry(collection.to_string()).or_default();
        coll.check_unique(collection, &id, &fields)?;
        coll.index_insert(&id, &fields);
        coll.docs.insert(id.clone(), fields);
        debug!(collection, id = %id, "inserted document");
        Ok(id)
    }

    /// Get a document by id, with `_id` injected.
    pub async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<JsonMap>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(collection)
            .and_then(|c| c.docs.get(id))
            .map(|fields| with_id(id, fields)))
    }

    /// Merge `patch` into an existing document. Indexed fields are re-keyed
    /// atomically; a collision with another document fails the whole update.
    pub async fn update(&self, collection: &str, id: &str, patch: JsonMap) -> StoreResult<JsonMap> {
        let mut inner = self.inner.write().await;
        let coll = inner
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(format!("{}/{}", collection, id)))?;

        let old = coll
            .docs
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("{}/{}", collection, id)))?;

        let mut merged = old.clone();
        for (key, value) in patch {
            if key != "_id" {
                merged.insert(key, value);
            }
        }

        coll.check_unique(collection, id, &merged)?;

        // Re-key: drop entries for the old field values, add the new ones.
        coll.index_remove(&old);
        coll.index_insert(id, &merged);
        coll.docs.insert(id.to_string(), merged.clone());
        Ok(with_id(id, &merged))
    }

    /// Merge into the document with the given id, creating it if absent.
    /// Used for the singleton configuration documents.
    pub async fn upsert(&self, collection: &str, id: &str, patch: JsonMap) -> StoreResult<JsonMap> {
        let mut inner = self.inner.write().await;
        let coll = inner.entry(collection.to_string()).or_default();

        let mut merged = coll.docs.get(id).cloned().unwrap_or_default();
        for (key, value) in patch {
            if key != "_id" {
                merged.insert(key, value);
            }
        }

        coll.check_unique(collection, id, &merged)?;
        if let Some(old) = coll.docs.get(id).cloned() {
            coll.index_remove(&old);
        }
        coll.index_insert(id, &merged);
        coll.docs.insert(id.to_string(), merged.clone());
        Ok(with_id(id, &merged))
    }

    /// Delete a document. Idempotent; reports whether it was present.
    pub async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        Ok(inner
            .get_mut(collection)
            .map(|c| c.remove_doc(id))
            .unwrap_or(false))
    }

    /// All documents whose top-level `field` equals `value`.
    pub async fn find_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<JsonMap>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(collection)
            .map(|c| {
                c.docs
                    .iter()
                    .filter(|(_, fields)| fields.get(field) == Some(value))
                    .map(|(id, fields)| with_id(id, fields))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// First document whose top-level `field` equals `value`.
    pub async fn find_one_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Option<JsonMap>> {
        Ok(self.find_eq(collection, field, value).await?.into_iter().next())
    }

    /// All documents whose top-level `field` is one of `values`.
    pub async fn find_in(
        &self,
        collection: &str,
        field: &str,
        values: &[Value],
    ) -> StoreResult<Vec<JsonMap>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(collection)
            .map(|c| {
                c.docs
                    .iter()
                    .filter(|(_, fields)| {
                        fields
                            .get(field)
                            .map(|v| values.contains(v))
                            .unwrap_or(false)
                    })
                    .map(|(id, fields)| with_id(id, fields))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.get(collection).map(|c| c.docs.len() as u64).unwrap_or(0))
    }

    /// Number of documents whose top-level `field` equals `value`.
    pub async fn count_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(collection)
            .map(|c| {
                c.docs
                    .values()
                    .filter(|fields| fields.get(field) == Some(value))
                    .count() as u64
            })
            .unwrap_or(0))
    }

    /// Apply every delete spec under one write lock. The whole batch is a
    /// single logical unit of work: readers observe either none of it or
    /// all of it. Returns the number of documents removed.
    pub async fn batch_delete(&self, specs: &[DeleteSpec]) -> StoreResult<usize> {
        let mut inner = self.inner.write().await;
        let mut removed = 0;

        for spec in specs {
            match spec {
                DeleteSpec::ById { collection, id } => {
                    if let Some(coll) = inner.get_mut(collection.as_str()) {
                        if coll.remove_doc(id) {
                            removed += 1;
                        }
                    }
                }
                DeleteSpec::ByField {
                    collection,
                    field,
                    value,
                } => {
                    if let Some(coll) = inner.get_mut(collection.as_str()) {
                        let ids: Vec<String> = coll
                            .docs
                            .iter()
                            .filter(|(_, fields)| fields.get(field.as_str()) == Some(value))
                            .map(|(id, _)| id.clone())
                            .collect();
                        for id in ids {
                            if coll.remove_doc(&id) {
                                removed += 1;
                            }
                        }
                    }
                }
                DeleteSpec::ByFieldIn {
                    collection,
                    field,
                    values,
                } => {
                    if let Some(coll) = inner.get_mut(collection.as_str()) {
                        let ids: Vec<String> = coll
                            .docs
                            .iter()
                            .filter(|(_, fields)| {
                                fields
                                    .get(field.as_str())
                                    .map(|v| values.contains(v))
                                    .unwrap_or(false)
                            })
                            .map(|(id, _)| id.clone())
                            .collect();
                        for id in ids {
                            if coll.remove_doc(&id) {
                                removed += 1;
                            }
                        }
                    }
                }
            }
        }

        debug!(removed, "batch delete applied");
        Ok(removed)
    }
}
