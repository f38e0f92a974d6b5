use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::account::errors::StoreError;
use crate::account::models::Document;
use crate::account::models::Filter;
use crate::account::ports::CredentialStore;

const ID_FIELD: &str = "_id";

/// In-process document store.
///
/// Collections are created on first write. Fields declared unique for a
/// collection are checked under the write lock, so concurrent creates cannot
/// both insert the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    /// Map of collection name -> documents in insertion order
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
    /// Map of collection name -> fields that must be unique
    unique_fields: HashMap<String, HashSet<String>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce uniqueness of `fields` within `collection` on create.
    pub fn with_unique_fields<I, F>(mut self, collection: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.unique_fields
            .entry(collection.into())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn conflicting_field(&self, collection: &str, existing: &[Document], record: &Document) -> Option<String> {
        let fields = self.unique_fields.get(collection)?;

        fields
            .iter()
            .filter(|field| field.as_str() != ID_FIELD)
            .find(|field| {
                record.get(field.as_str()).is_some_and(|value| {
                    existing
                        .iter()
                        .any(|document| document.get(field.as_str()) == Some(value))
                })
            })
            .cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryDocumentStore {
    async fn create(&self, collection: &str, mut record: Document) -> Result<String, StoreError> {
        let id = match record.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => {
                return Err(StoreError::InvalidRecord(format!(
                    "`{}` must be a string, got {}",
                    ID_FIELD, other
                )))
            }
            None => {
                let id = Uuid::new_v4().to_string();
                record.insert(ID_FIELD.to_string(), Value::String(id.clone()));
                id
            }
        };

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents
            .iter()
            .any(|document| document.get(ID_FIELD) == record.get(ID_FIELD))
        {
            return Err(StoreError::Conflict(ID_FIELD.to_string()));
        }

        if let Some(field) = self.conflicting_field(collection, documents, &record) {
            return Err(StoreError::Conflict(field));
        }

        documents.push(record);

        tracing::debug!(collection, id = %id, "Document created");

        Ok(id)
    }

    async fn read(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn read_one(&self, collection: &str, filter: &Filter) -> Result<Document, StoreError> {
        let collections = self.collections.read().await;

        collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|document| filter.matches(document)))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))
    }

    async fn update(
        &self,
        collection: &str,
        filter: &Filter,
        changes: Document,
    ) -> Result<u64, StoreError> {
        if changes.contains_key(ID_FIELD) {
            return Err(StoreError::InvalidRecord(format!(
                "`{}` cannot be updated",
                ID_FIELD
            )));
        }

        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let mut updated = 0;
        for document in documents.iter_mut().filter(|document| filter.matches(document)) {
            for (field, value) in &changes {
                document.insert(field.clone(), value.clone());
            }
            updated += 1;
        }

        Ok(updated)
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = documents.len();
        documents.retain(|document| !filter.matches(document));

        Ok((before - documents.len()) as u64)
    }
}
