//! Live synchronization of the workout collection.
//!
//! The remote store is authoritative. The local mirror is a cache that is
//! **replaced wholesale** by every snapshot a subscription receives: there is
//! no diffing, merging or client-side sorting, so the mirror always shows the
//! remote contents in the order the store returned them.
//!
//! Mutations never touch the mirror directly. A created, updated or deleted
//! record shows up through the next snapshot delivered to the active
//! subscription.

use std::sync::{Arc, PoisonError, RwLock};

use fittrack_backend::{DocumentStore, Snapshot};
use fittrack_core::types::RecordId;
use fittrack_core::validation::{validate_record_id, validate_title};
use fittrack_core::{CoreError, WorkoutDraft, WorkoutPatch, WorkoutRecord};
use fittrack_events::{AppEvent, EventBus, EventKind};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct WorkoutSync {
    store: Arc<dyn DocumentStore>,
    collection: String,
    mirror: Arc<RwLock<Vec<WorkoutRecord>>>,
    bus: Arc<EventBus>,
    /// Parent of every subscription's token.
    shutdown: CancellationToken,
}

impl WorkoutSync {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            mirror: Arc::new(RwLock::new(Vec::new())),
            bus,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The local mirror as of the last applied snapshot.
    pub fn mirror(&self) -> Vec<WorkoutRecord> {
        self.mirror
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start a standing subscription.
    ///
    /// `on_change` runs once with the current contents before this returns,
    /// then again with the full contents after every remote change until the
    /// returned [`Subscription`] is unsubscribed or dropped.
    pub async fn subscribe<F>(&self, mut on_change: F) -> Result<Subscription, CoreError>
    where
        F: FnMut(Vec<WorkoutRecord>) + Send + 'static,
    {
        let listener = self.store.listen(&self.collection).await?;
        let applier = SnapshotApplier {
            mirror: Arc::clone(&self.mirror),
            bus: Arc::clone(&self.bus),
        };

        on_change(applier.apply(&listener.initial));

        let cancel = self.shutdown.child_token();
        let handle = tokio::spawn(run_subscription(
            listener.updates,
            cancel.clone(),
            applier,
            on_change,
        ));

        tracing::info!(collection = %self.collection, "Workout subscription started");
        Ok(Subscription {
            cancel,
            handle: Some(handle),
        })
    }

    /// Store a new workout and return the id the store assigned to it.
    pub async fn create(&self, draft: &WorkoutDraft) -> Result<RecordId, CoreError> {
        validate_title(&draft.title)?;
        let id = self.store.add(&self.collection, draft.to_fields()).await?;
        tracing::info!(collection = %self.collection, %id, "Workout created");
        Ok(id)
    }

    /// Rewrite the title and description of an existing workout.
    ///
    /// Only those two fields are sent. Anything else carried by the value
    /// converted into the patch, such as an owner or id, is dropped.
    pub async fn update(&self, id: &str, patch: impl Into<WorkoutPatch>) -> Result<(), CoreError> {
        let patch = patch.into();
        validate_record_id(id)?;
        validate_title(&patch.title)?;
        self.store
            .update(&self.collection, id, patch.to_fields())
            .await?;
        tracing::info!(collection = %self.collection, %id, "Workout updated");
        Ok(())
    }

    /// Delete a workout. Deleting the same id twice fails the second time.
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        validate_record_id(id)?;
        self.store.delete(&self.collection, id).await?;
        tracing::info!(collection = %self.collection, %id, "Workout deleted");
        Ok(())
    }

    /// Point read straight from the store, bypassing the mirror.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<WorkoutRecord>, CoreError> {
        validate_record_id(id)?;
        let document = self.store.get(&self.collection, id).await?;
        Ok(document.map(|d| WorkoutRecord::from_fields(d.id, &d.fields)))
    }

    /// One-shot read of the whole collection. Does not touch the mirror.
    pub async fn fetch_all(&self) -> Result<Vec<WorkoutRecord>, CoreError> {
        let documents = self.store.list(&self.collection).await?;
        Ok(documents
            .into_iter()
            .map(|d| WorkoutRecord::from_fields(d.id, &d.fields))
            .collect())
    }

    /// Stop every subscription created by this instance.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Replaces the mirror with each snapshot it is given.
struct SnapshotApplier {
    mirror: Arc<RwLock<Vec<WorkoutRecord>>>,
    bus: Arc<EventBus>,
}

impl SnapshotApplier {
    fn apply(&self, snapshot: &Snapshot) -> Vec<WorkoutRecord> {
        let records: Vec<WorkoutRecord> = snapshot
            .documents
            .iter()
            .map(|d| WorkoutRecord::from_fields(d.id.clone(), &d.fields))
            .collect();

        *self.mirror.write().unwrap_or_else(PoisonError::into_inner) = records.clone();

        tracing::debug!(
            collection = %snapshot.collection,
            count = records.len(),
            "Workout snapshot applied"
        );
        self.bus.publish(AppEvent::new(EventKind::SnapshotApplied {
            collection: snapshot.collection.clone(),
            count: records.len(),
        }));
        records
    }
}

async fn run_subscription<F>(
    mut updates: broadcast::Receiver<Snapshot>,
    cancel: CancellationToken,
    applier: SnapshotApplier,
    mut on_change: F,
) where
    F: FnMut(Vec<WorkoutRecord>) + Send + 'static,
{
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            received = updates.recv() => match received {
                Ok(snapshot) => on_change(applier.apply(&snapshot)),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Later snapshots still carry the full contents.
                    tracing::warn!(skipped = n, "Workout subscription lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Workout collection closed by the store");
                    break;
                }
            },
        }
    }
}

/// Handle to a standing subscription.
///
/// Dropping the handle stops the subscription too, without waiting for it.
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop callbacks and release the listener at the store.
    ///
    /// Once this returns no further callback runs. Calling it again is a
    /// no-op.
    pub async fn unsubscribe(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.cancel.cancel();
        if let Err(e) = handle.await {
            if e.is_panic() {
                tracing::error!(error = %e, "Workout subscription callback panicked");
            }
        }
        tracing::info!("Workout subscription stopped");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use fittrack_backend::InMemoryDocumentStore;
    use fittrack_core::StoreError;
    use tokio::sync::mpsc;

    use super::*;

    fn sync() -> (WorkoutSync, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let sync = WorkoutSync::new(store.clone(), "tasks", Arc::new(EventBus::default()));
        (sync, store)
    }

    #[tokio::test]
    async fn create_rejects_blank_title_before_the_store() {
        let (sync, store) = sync();
        let result = sync.create(&WorkoutDraft::new("   ", "x")).await;
        assert_matches!(result, Err(CoreError::Validation(_)));
        assert!(store.list("tasks").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_by_id_reads_without_a_subscription() {
        let (sync, _store) = sync();
        let id = sync
            .create(&WorkoutDraft::new("Leg Day", "squats").owned_by("u1"))
            .await
            .expect("create should succeed");

        let record = sync
            .get_by_id(&id)
            .await
            .expect("read should succeed")
            .expect("record should exist");
        assert_eq!(record.title, "Leg Day");
        assert_eq!(record.owner_id.as_deref(), Some("u1"));
        assert!(sync.mirror().is_empty(), "point reads never fill the mirror");
    }

    #[tokio::test]
    async fn get_by_id_of_missing_record_is_none() {
        let (sync, _store) = sync();
        assert!(sync.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_missing_record_fails() {
        let (sync, _store) = sync();
        let result = sync.update("missing", WorkoutPatch::new("t", "d")).await;
        assert_matches!(result, Err(CoreError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_requires_an_id() {
        let (sync, _store) = sync();
        assert_matches!(
            sync.delete("").await,
            Err(CoreError::Store(StoreError::InvalidInput(_)))
        );
    }

    #[tokio::test]
    async fn subscription_fires_immediately_then_on_change() {
        let (sync, _store) = sync();
        sync.create(&WorkoutDraft::new("a", "")).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sub = sync
            .subscribe(move |items| {
                let _ = tx.send(items);
            })
            .await
            .expect("subscribe should succeed");

        let initial = rx.try_recv().expect("initial callback runs before subscribe returns");
        assert_eq!(initial.len(), 1);
        assert_eq!(sync.mirror(), initial);

        sync.create(&WorkoutDraft::new("b", "")).await.unwrap();
        let next = rx.recv().await.expect("callback after create");
        let titles: Vec<_> = next.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);

        sub.unsubscribe().await;
        assert!(!sub.is_active());
    }

    #[tokio::test]
    async fn unsubscribe_stops_callbacks_and_releases_listener() {
        let (sync, store) = sync();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sub = sync
            .subscribe(move |items| {
                let _ = tx.send(items);
            })
            .await
            .unwrap();
        assert_eq!(store.listener_count("tasks").await, 1);
        rx.try_recv().expect("initial callback");

        sub.unsubscribe().await;
        sub.unsubscribe().await;
        assert_eq!(store.listener_count("tasks").await, 0);

        sync.create(&WorkoutDraft::new("late", "")).await.unwrap();
        // The sender was dropped with the task, so the channel is closed and empty.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn shutdown_cancels_live_subscriptions() {
        let (sync, store) = sync();
        let mut sub = sync.subscribe(|_| {}).await.unwrap();
        sync.shutdown();
        sub.unsubscribe().await;
        assert_eq!(store.listener_count("tasks").await, 0);
    }

    #[tokio::test]
    async fn fetch_all_maps_every_document() {
        let (sync, _store) = sync();
        sync.create(&WorkoutDraft::new("a", "1")).await.unwrap();
        sync.create(&WorkoutDraft::new("b", "2")).await.unwrap();
        let all = sync.fetch_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].description, "2");
    }

    #[tokio::test]
    async fn subscribe_fails_when_store_is_offline() {
        let (sync, store) = sync();
        store.set_online(false);
        let result = sync.subscribe(|_| {}).await;
        assert_matches!(result, Err(CoreError::Store(StoreError::Unavailable(_))));
    }
}
