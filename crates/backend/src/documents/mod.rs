//! Document store interface.
//!
//! A store holds named collections of documents keyed by store-generated ids.
//! Listeners receive the **full** contents of a collection after every
//! change, never a delta.

pub mod memory;

use async_trait::async_trait;
use fittrack_core::types::{Fields, RecordId, Timestamp};
use fittrack_core::StoreError;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    pub fields: Fields,
}

/// The full contents of a collection at one point in time, in store order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub collection: String,
    pub documents: Vec<Document>,
    pub read_at: Timestamp,
}

/// A standing subscription to one collection.
///
/// `initial` is the contents at the moment the listener was registered;
/// `updates` yields a fresh [`Snapshot`] after every later change. Dropping
/// the listener releases it on the store side.
#[derive(Debug)]
pub struct Listener {
    pub initial: Snapshot,
    pub updates: broadcast::Receiver<Snapshot>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document and return its generated id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<RecordId, StoreError>;

    /// Point read. `Ok(None)` when no document has this id.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// One-shot read of every document in the collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Merge `fields` into an existing document. Fields not named are kept.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Remove a document. Removing a missing document is
    /// [`StoreError::NotFound`].
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Register a listener on the collection.
    async fn listen(&self, collection: &str) -> Result<Listener, StoreError>;
}
