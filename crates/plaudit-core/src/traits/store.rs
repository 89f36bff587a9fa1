//! Document store trait.

use async_trait::async_trait;

use crate::document::FieldMap;
use crate::types::{CollectionName, DocumentId, StoreUrl};
use crate::Result;

use super::SnapshotStream;

/// A document store implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Watch stream type for this store.
    type Watch: SnapshotStream;

    /// Returns the store URL for this instance.
    fn url(&self) -> &StoreUrl;

    /// Create a new document in a collection.
    ///
    /// The store assigns the document id and resolves any server-timestamp
    /// sentinel fields to a server-assigned timestamp.
    async fn create_document(
        &self,
        collection: &CollectionName,
        fields: &FieldMap,
    ) -> Result<DocumentId>;

    /// Replace the named fields on an existing document.
    ///
    /// Fields not named in `fields` are left untouched. Fails with a
    /// protocol error if the document does not exist.
    async fn update_document(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        fields: &FieldMap,
    ) -> Result<()>;

    /// Delete a document.
    ///
    /// Idempotent: succeeds even if the document is already absent.
    async fn delete_document(&self, collection: &CollectionName, id: &DocumentId) -> Result<()>;

    /// Subscribe to a collection.
    ///
    /// The returned stream yields the current [`Snapshot`](crate::Snapshot)
    /// of the collection immediately, then a full snapshot every time its
    /// contents change, by any client, including this one. Delivery stops
    /// when the stream is dropped.
    fn watch(&self, collection: &CollectionName) -> Result<Self::Watch>;
}
