//! In-process document store with push-based subscriptions.
//!
//! Backs the test suites and local embedding of the board components. The
//! snapshot contract matches the hosted backend: subscribers receive the
//! current collection state immediately, then a full replacement snapshot
//! after every mutation.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};
use sweetslot_core::StoreTimestamp;
use tokio::sync::mpsc;
use tracing::debug;

use crate::document::{
    Document, DocumentPatch, QueryOp, Snapshot, Subscription, SubscriptionEvent,
};
use crate::{DocumentStore, StoreError};

#[derive(Default)]
struct Collection {
    docs: BTreeMap<String, Map<String, Value>>,
    watchers: Vec<mpsc::UnboundedSender<SubscriptionEvent>>,
}

impl Collection {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            documents: self
                .docs
                .iter()
                .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                .collect(),
        }
    }

    /// Publish the current state to every live watcher, dropping closed ones.
    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.watchers
            .retain(|tx| tx.send(SubscriptionEvent::Snapshot(snapshot.clone())).is_ok());
    }
}

/// An in-process [`DocumentStore`].
///
/// Cheaply cloneable; clones share the same collections and watchers.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Collection>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document without going through a patch (test convenience).
    pub fn insert(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        let mut inner = self.lock();
        let coll = inner.entry(collection.to_owned()).or_default();
        coll.docs.insert(id.to_owned(), fields);
        coll.publish();
    }

    /// Push a listener error to every subscriber of a collection.
    ///
    /// Models the hosted backend revoking a listener (permission change,
    /// network drop) so stale-but-available handling can be exercised.
    pub fn fail_subscribers(&self, collection: &str, error: StoreError) {
        let mut inner = self.lock();
        let coll = inner.entry(collection.to_owned()).or_default();
        coll.watchers
            .retain(|tx| tx.send(SubscriptionEvent::Error(error.clone())).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Collection>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .get(collection)
            .and_then(|coll| coll.docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let inner = self.lock();
        Ok(inner
            .get(collection)
            .map(|coll| coll.snapshot().documents)
            .unwrap_or_default())
    }

    async fn query_documents(
        &self,
        collection: &str,
        field: &str,
        op: QueryOp,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let inner = self.lock();
        let Some(coll) = inner.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(coll
            .docs
            .iter()
            .filter(|(_, fields)| match op {
                QueryOp::Eq => fields.get(field) == Some(value),
            })
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: DocumentPatch,
    ) -> Result<(), StoreError> {
        let resolved = patch.resolve(StoreTimestamp::now());
        let mut inner = self.lock();
        let coll = inner
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_owned(),
                id: id.to_owned(),
            })?;
        let fields = coll.docs.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: collection.to_owned(),
            id: id.to_owned(),
        })?;
        for (name, value) in resolved {
            fields.insert(name, value);
        }
        debug!(collection, id, "document updated");
        coll.publish();
        Ok(())
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        patch: DocumentPatch,
        merge: bool,
    ) -> Result<(), StoreError> {
        let resolved = patch.resolve(StoreTimestamp::now());
        let mut inner = self.lock();
        let coll = inner.entry(collection.to_owned()).or_default();
        let entry = coll.docs.entry(id.to_owned()).or_default();
        if !merge {
            entry.clear();
        }
        for (name, value) in resolved {
            entry.insert(name, value);
        }
        debug!(collection, id, merge, "document set");
        coll.publish();
        Ok(())
    }

    fn subscribe(&self, collection: &str) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let coll = inner.entry(collection.to_owned()).or_default();
        // Initial snapshot first, then the sender joins the watcher list.
        let _ = tx.send(SubscriptionEvent::Snapshot(coll.snapshot()));
        coll.watchers.push(tx);
        Subscription::from_channel(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let store = MemoryStore::new();
        store.insert("admins", "a1", fields(&[("role", json!("admin"))]));
        store.insert("admins", "a2", fields(&[("role", json!("superadmin"))]));

        let doc = store
            .get_document("admins", "a1")
            .await
            .expect("store ok")
            .expect("present");
        assert_eq!(doc.field("role"), Some(&json!("admin")));

        let all = store.list_documents("admins").await.expect("store ok");
        assert_eq!(all.len(), 2);

        assert!(
            store
                .get_document("admins", "missing")
                .await
                .expect("store ok")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_query_eq() {
        let store = MemoryStore::new();
        store.insert("users", "u1", fields(&[("phone", json!("+911234567890"))]));
        store.insert("users", "u2", fields(&[("phone", json!("+919999999999"))]));

        let hits = store
            .query_documents("users", "phone", QueryOp::Eq, &json!("+911234567890"))
            .await
            .expect("store ok");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().map(|d| d.id.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update_document("bookings", "nope", DocumentPatch::new())
            .await
            .expect_err("missing doc");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_merge_preserves_other_fields() {
        let store = MemoryStore::new();
        store.insert("users", "u1", fields(&[("name", json!("Asha"))]));

        store
            .set_document(
                "users",
                "u1",
                DocumentPatch::new().field("phone", json!("+911234567890")),
                true,
            )
            .await
            .expect("store ok");

        let doc = store
            .get_document("users", "u1")
            .await
            .expect("store ok")
            .expect("present");
        assert_eq!(doc.field("name"), Some(&json!("Asha")));
        assert_eq!(doc.field("phone"), Some(&json!("+911234567890")));
    }

    #[tokio::test]
    async fn test_subscribe_initial_and_mutation_snapshots() {
        let store = MemoryStore::new();
        store.insert("bookings", "b1", fields(&[("shop", json!("bandra"))]));

        let mut sub = store.subscribe("bookings");
        match sub.recv().await {
            Some(SubscriptionEvent::Snapshot(snap)) => assert_eq!(snap.len(), 1),
            other => panic!("expected initial snapshot, got {other:?}"),
        }

        store.insert("bookings", "b2", fields(&[("shop", json!("andheri"))]));
        match sub.recv().await {
            Some(SubscriptionEvent::Snapshot(snap)) => assert_eq!(snap.len(), 2),
            other => panic!("expected replacement snapshot, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let store = MemoryStore::new();
        let sub = store.subscribe("bookings");
        drop(sub);
        // Publish after the receiver is gone; the watcher list shrinks.
        store.insert("bookings", "b1", fields(&[("shop", json!("bandra"))]));
        let inner = store.lock();
        let watchers = inner.get("bookings").map_or(0, |c| c.watchers.len());
        assert_eq!(watchers, 0);
    }

    #[tokio::test]
    async fn test_fail_subscribers_delivers_error() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe("bookings");
        // Skip initial snapshot.
        let _ = sub.recv().await;

        store.fail_subscribers("bookings", StoreError::PermissionDenied("bookings".into()));
        match sub.recv().await {
            Some(SubscriptionEvent::Error(StoreError::PermissionDenied(_))) => {}
            other => panic!("expected error event, got {other:?}"),
        }
    }
}
