//! Hosted document store client.

use async_trait::async_trait;
use tracing::{debug, instrument};

use plaudit_core::{
    CollectionName, DocumentId, DocumentStore, FieldMap, Result, StoreUrl,
};

use crate::client::HttpClient;
use crate::watch::HttpWatch;

/// Request body for document creation.
#[derive(Debug, serde::Serialize)]
struct CreateDocumentRequest<'a> {
    fields: &'a serde_json::Value,
}

/// Response from document creation.
#[derive(Debug, serde::Deserialize)]
struct CreateDocumentResponse {
    id: String,
}

/// Request body for document update.
#[derive(Debug, serde::Serialize)]
struct UpdateDocumentRequest<'a> {
    fields: &'a serde_json::Value,
}

/// A hosted document store reached over HTTP, with snapshot delivery over
/// a WebSocket subscription.
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    store: StoreUrl,
    client: HttpClient,
}

impl HttpDocumentStore {
    /// Create a new client for the given store URL.
    pub fn new(store: StoreUrl) -> Self {
        let client = HttpClient::new(store.clone());
        Self { store, client }
    }

    /// Returns the store URL for this instance.
    pub fn url(&self) -> &StoreUrl {
        &self.store
    }

    fn documents_path(collection: &CollectionName) -> String {
        format!("v1/collections/{}/documents", collection)
    }

    fn document_path(collection: &CollectionName, id: &DocumentId) -> String {
        format!("v1/collections/{}/documents/{}", collection, id)
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    type Watch = HttpWatch;

    fn url(&self) -> &StoreUrl {
        &self.store
    }

    #[instrument(skip(self, fields), fields(%collection))]
    async fn create_document(
        &self,
        collection: &CollectionName,
        fields: &FieldMap,
    ) -> Result<DocumentId> {
        debug!("Creating document");

        let request = CreateDocumentRequest {
            fields: fields.as_value(),
        };

        let response: CreateDocumentResponse = self
            .client
            .post(&Self::documents_path(collection), &request)
            .await?;

        DocumentId::new(&response.id)
    }

    #[instrument(skip(self, fields), fields(%collection, %id))]
    async fn update_document(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        fields: &FieldMap,
    ) -> Result<()> {
        debug!("Updating document");

        let request = UpdateDocumentRequest {
            fields: fields.as_value(),
        };

        self.client
            .patch_no_response(&Self::document_path(collection, id), &request)
            .await
    }

    #[instrument(skip(self), fields(%collection, %id))]
    async fn delete_document(&self, collection: &CollectionName, id: &DocumentId) -> Result<()> {
        debug!("Deleting document");

        self.client
            .delete_no_response(&Self::document_path(collection, id))
            .await
    }

    fn watch(&self, collection: &CollectionName) -> Result<Self::Watch> {
        let store = self.store.clone();
        let collection = collection.clone();
        let (tx, mut rx) = tokio::sync::mpsc::channel::<Result<plaudit_core::Snapshot>>(16);

        tokio::spawn(async move {
            match HttpWatch::from_websocket(&store, &collection).await {
                Ok(mut stream) => {
                    use futures_util::StreamExt;
                    while let Some(snapshot) = stream.next().await {
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                }
            }
        });

        let stream = async_stream::stream! {
            while let Some(snapshot) = rx.recv().await {
                yield snapshot;
            }
        };

        Ok(HttpWatch::new(stream))
    }
}
