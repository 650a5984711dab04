//! Documents, snapshots, patches, and subscriptions.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sweetslot_core::StoreTimestamp;
use tokio::sync::mpsc;

use crate::StoreError;

/// A single document: store-assigned id plus its JSON fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned document id.
    pub id: String,
    /// The document's fields.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create a document from an id and fields.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Deserialize the fields into a typed record.
    ///
    /// Unknown fields are ignored, matching how documents accrete fields
    /// over time in the shared store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] when the fields do not match the
    /// target shape.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| StoreError::Backend(format!("malformed document {}: {e}", self.id)))
    }

    /// Borrow a field value by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// A full push of the current collection state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Every document currently in the collection.
    pub documents: Vec<Document>,
}

impl Snapshot {
    /// Number of documents in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Comparison operator for [`query_documents`](crate::DocumentStore::query_documents).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOp {
    /// Field equals the given value.
    Eq,
}

/// A single field write inside a [`DocumentPatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteValue {
    /// Write this literal value.
    Value(Value),
    /// Ask the store to write its own current timestamp.
    ServerTimestamp,
}

/// An ordered set of field writes.
///
/// Built with a small builder so call sites read like the store API:
///
/// ```
/// use serde_json::json;
/// use sweetslot_store::DocumentPatch;
///
/// let patch = DocumentPatch::new()
///     .field("status", json!("Cancelled"))
///     .server_timestamp("updatedAt");
/// assert_eq!(patch.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    entries: Vec<(String, WriteValue)>,
}

impl DocumentPatch {
    /// Create an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a literal field write.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.entries.push((name.into(), WriteValue::Value(value)));
        self
    }

    /// Add a server-generated timestamp write.
    #[must_use]
    pub fn server_timestamp(mut self, name: impl Into<String>) -> Self {
        self.entries.push((name.into(), WriteValue::ServerTimestamp));
        self
    }

    /// The field writes in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, WriteValue)] {
        &self.entries
    }

    /// Number of field writes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the patch carries no writes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the patch into concrete fields, stamping server timestamps
    /// with `now`.
    #[must_use]
    pub fn resolve(&self, now: StoreTimestamp) -> Map<String, Value> {
        let mut fields = Map::new();
        for (name, write) in &self.entries {
            let value = match write {
                WriteValue::Value(v) => v.clone(),
                WriteValue::ServerTimestamp => serde_json::json!({
                    "seconds": now.seconds,
                    "nanos": now.nanos,
                }),
            };
            fields.insert(name.clone(), value);
        }
        fields
    }
}

/// One event on a live collection subscription.
#[derive(Debug, Clone)]
pub enum SubscriptionEvent {
    /// A full replacement snapshot of the collection.
    Snapshot(Snapshot),
    /// The listener failed; the previous snapshot remains the best known
    /// state (stale-but-available).
    Error(StoreError),
}

/// A live collection subscription.
///
/// Dropping the subscription releases the underlying listener; the store
/// prunes closed receivers on its next publish.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<SubscriptionEvent>,
}

impl Subscription {
    /// Wrap a receiver produced by a store implementation.
    #[must_use]
    pub const fn from_channel(rx: mpsc::UnboundedReceiver<SubscriptionEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event. `None` means the store side closed.
    pub async fn recv(&mut self) -> Option<SubscriptionEvent> {
        self.rx.recv().await
    }

    /// Non-blocking poll, used by drivers that interleave UI work.
    pub fn try_recv(&mut self) -> Option<SubscriptionEvent> {
        self.rx.try_recv().ok()
    }
}
