//! In-process [`DocumentStore`].
//!
//! Each collection keeps its documents in creation order and owns a
//! broadcast channel. Every mutation publishes the new contents while the
//! write lock is still held, so listeners observe changes in the order they
//! were applied and a listener registered between two changes misses
//! neither.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use fittrack_core::types::{Fields, RecordId};
use fittrack_core::StoreError;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use super::{Document, DocumentStore, Listener, Snapshot};

/// Buffer capacity of each collection's snapshot channel.
const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

struct Collection {
    name: String,
    documents: Vec<Document>,
    sender: broadcast::Sender<Snapshot>,
}

impl Collection {
    fn new(name: &str) -> Self {
        let (sender, _) = broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY);
        Self {
            name: name.to_string(),
            documents: Vec::new(),
            sender,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            collection: self.name.clone(),
            documents: self.documents.clone(),
            read_at: Utc::now(),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|d| d.id == id)
    }

    fn publish(&self) {
        // No listeners is fine.
        let _ = self.sender.send(self.snapshot());
    }
}

pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    online: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
        }
    }

    /// Simulate losing (or regaining) the connection to the store.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of listeners currently registered on `collection`.
    pub async fn listener_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, |c| c.sender.receiver_count())
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("document store is offline".into()))
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn require(value: &str, what: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(())
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<RecordId, StoreError> {
        self.ensure_online()?;
        require(collection, "collection")?;

        let mut collections = self.collections.write().await;
        let coll = collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection::new(collection));

        let id = Uuid::now_v7().simple().to_string();
        coll.documents.push(Document {
            id: id.clone(),
            fields,
        });
        coll.publish();

        tracing::debug!(%collection, %id, "Document added");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        require(id, "document id")?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.documents.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.documents.clone())
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.ensure_online()?;
        require(id, "document id")?;

        let mut collections = self.collections.write().await;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let index = coll.position(id).ok_or_else(|| not_found(collection, id))?;

        coll.documents[index].fields.extend(fields);
        coll.publish();

        tracing::debug!(%collection, %id, "Document updated");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.ensure_online()?;
        require(id, "document id")?;

        let mut collections = self.collections.write().await;
        let coll = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let index = coll.position(id).ok_or_else(|| not_found(collection, id))?;

        coll.documents.remove(index);
        coll.publish();

        tracing::debug!(%collection, %id, "Document deleted");
        Ok(())
    }

    async fn listen(&self, collection: &str) -> Result<Listener, StoreError> {
        self.ensure_online()?;
        require(collection, "collection")?;

        let mut collections = self.collections.write().await;
        let coll = collections
            .entry(collection.to_string())
            .or_insert_with(|| Collection::new(collection));

        Ok(Listener {
            initial: coll.snapshot(),
            updates: coll.sender.subscribe(),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().expect("test fields must be an object")
    }

    #[tokio::test]
    async fn add_then_get_round_trips_fields() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .add("tasks", fields(json!({"title": "Leg Day"})))
            .await
            .expect("add should succeed");
        assert!(!id.is_empty());

        let doc = store
            .get("tasks", &id)
            .await
            .expect("get should succeed")
            .expect("document should exist");
        assert_eq!(doc.fields["title"], "Leg Day");
    }

    #[tokio::test]
    async fn list_keeps_creation_order() {
        let store = InMemoryDocumentStore::new();
        let a = store.add("tasks", fields(json!({"title": "a"}))).await.unwrap();
        let b = store.add("tasks", fields(json!({"title": "b"}))).await.unwrap();
        let c = store.add("tasks", fields(json!({"title": "c"}))).await.unwrap();

        let ids: Vec<_> = store
            .list("tasks")
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[tokio::test]
    async fn missing_document_reads_as_none() {
        let store = InMemoryDocumentStore::new();
        assert!(store.get("tasks", "nope").await.unwrap().is_none());
        assert!(store.list("tasks").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_and_keeps_other_fields() {
        let store = InMemoryDocumentStore::new();
        let id = store
            .add("tasks", fields(json!({"title": "a", "userId": "u1"})))
            .await
            .unwrap();

        store
            .update("tasks", &id, fields(json!({"title": "b", "description": "d"})))
            .await
            .expect("update should succeed");

        let doc = store.get("tasks", &id).await.unwrap().unwrap();
        assert_eq!(doc.fields["title"], "b");
        assert_eq!(doc.fields["description"], "d");
        assert_eq!(doc.fields["userId"], "u1");
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_document_are_not_found() {
        let store = InMemoryDocumentStore::new();
        assert_matches!(
            store.update("tasks", "nope", Fields::new()).await,
            Err(StoreError::NotFound { .. })
        );
        assert_matches!(
            store.delete("tasks", "nope").await,
            Err(StoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn delete_twice_fails_the_second_time() {
        let store = InMemoryDocumentStore::new();
        let id = store.add("tasks", Fields::new()).await.unwrap();
        store.delete("tasks", &id).await.expect("first delete should succeed");
        assert_matches!(
            store.delete("tasks", &id).await,
            Err(StoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn empty_id_is_invalid_input() {
        let store = InMemoryDocumentStore::new();
        assert_matches!(store.delete("tasks", "").await, Err(StoreError::InvalidInput(_)));
        assert_matches!(store.get("tasks", " ").await, Err(StoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn listener_gets_initial_contents_then_full_snapshots() {
        let store = InMemoryDocumentStore::new();
        let first = store.add("tasks", fields(json!({"title": "a"}))).await.unwrap();

        let mut listener = store.listen("tasks").await.expect("listen should succeed");
        assert_eq!(listener.initial.documents.len(), 1);
        assert_eq!(store.listener_count("tasks").await, 1);

        store.add("tasks", fields(json!({"title": "b"}))).await.unwrap();
        let snap = listener.updates.recv().await.expect("snapshot after add");
        assert_eq!(snap.documents.len(), 2);

        store.delete("tasks", &first).await.unwrap();
        let snap = listener.updates.recv().await.expect("snapshot after delete");
        assert_eq!(snap.documents.len(), 1);
        assert_eq!(snap.documents[0].fields["title"], "b");

        drop(listener);
        assert_eq!(store.listener_count("tasks").await, 0);
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let store = InMemoryDocumentStore::new();
        let mut listener = store.listen("tasks").await.unwrap();
        store.add("other", Fields::new()).await.unwrap();
        store.add("tasks", Fields::new()).await.unwrap();

        let snap = listener.updates.recv().await.unwrap();
        assert_eq!(snap.collection, "tasks");
        assert_eq!(snap.documents.len(), 1);
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = InMemoryDocumentStore::new();
        store.set_online(false);
        assert_matches!(
            store.add("tasks", Fields::new()).await,
            Err(StoreError::Unavailable(_))
        );
        assert_matches!(store.listen("tasks").await, Err(StoreError::Unavailable(_)));
    }
}
