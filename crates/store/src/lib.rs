//! Sweet Slot Store - document store seam.
//!
//! The production backend is a hosted document database; everything in this
//! workspace talks to it through the [`DocumentStore`] trait so the session
//! resolver and booking board stay testable and backend-agnostic.
//!
//! # Modules
//!
//! - [`document`] - `Document`, `Snapshot`, `DocumentPatch`, subscriptions
//! - [`memory`] - in-process implementation with real push subscriptions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod document;
pub mod memory;

mod error;

pub use document::{
    Document, DocumentPatch, QueryOp, Snapshot, Subscription, SubscriptionEvent, WriteValue,
};
pub use error::StoreError;
pub use memory::MemoryStore;

use serde_json::Value;

/// Operations the document store exposes to this workspace.
///
/// Every write accepts a [`DocumentPatch`], which may carry a
/// server-generated timestamp sentinel for `updatedAt`/`createdAt` fields.
/// [`DocumentStore::subscribe`] returns a live [`Subscription`] delivering
/// full-collection snapshots; dropping the subscription releases the
/// listener.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Fetch a single document, or `None` when it does not exist.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError>;

    /// List every document in a collection, ordered by document id.
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Return documents whose `field` satisfies `op` against `value`.
    async fn query_documents(
        &self,
        collection: &str,
        field: &str,
        op: QueryOp,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Apply a partial update to an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] when the document is absent.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: DocumentPatch,
    ) -> Result<(), StoreError>;

    /// Create or overwrite a document.
    ///
    /// With `merge` set, fields not named in the patch are preserved.
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        patch: DocumentPatch,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Open a live subscription to a whole collection.
    ///
    /// The current snapshot is delivered immediately; afterwards every
    /// mutation publishes a full replacement snapshot.
    fn subscribe(&self, collection: &str) -> Subscription;
}
