//! Store backend selection.
//!
//! The CLI reaches either the file-backed store or the hosted store,
//! chosen by the store URL's scheme.

use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use futures_util::Stream;
use url::Url;

use plaudit_core::{
    CollectionName, DocumentId, DocumentStore, FieldMap, Snapshot, SnapshotStream, StoreUrl,
};
use plaudit_file::FileDocumentStore;
use plaudit_http::HttpDocumentStore;

/// A store backend chosen at runtime from the store URL.
pub enum Store {
    /// Local filesystem store (file:// URL).
    File(FileDocumentStore),
    /// Hosted store (http(s):// URL).
    Http(HttpDocumentStore),
}

/// Watch stream over either backend.
pub struct BoxWatch {
    inner: Pin<Box<dyn SnapshotStream>>,
}

impl Stream for BoxWatch {
    type Item = plaudit_core::Result<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Open the backend for a store URL.
pub fn open(url: &StoreUrl) -> Result<Store> {
    if url.is_local() {
        let path = url
            .to_file_path()
            .context("Failed to convert file:// URL to path")?;
        Ok(Store::File(FileDocumentStore::new(path, url.clone())))
    } else {
        Ok(Store::Http(HttpDocumentStore::new(url.clone())))
    }
}

/// The default store URL: a file store under the platform data directory.
pub fn default_store_url() -> Result<StoreUrl> {
    let dirs = ProjectDirs::from("", "", "plaudit")
        .context("Could not determine a data directory for the default store")?;
    let path = dirs.data_dir().join("store");
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create store directory {}", path.display()))?;

    let url = Url::from_directory_path(&path)
        .map_err(|_| anyhow::anyhow!("Failed to convert {} to a file URL", path.display()))?;

    Ok(StoreUrl::new(url.as_str())?)
}

#[async_trait]
impl DocumentStore for Store {
    type Watch = BoxWatch;

    fn url(&self) -> &StoreUrl {
        match self {
            Store::File(store) => store.url(),
            Store::Http(store) => store.url(),
        }
    }

    async fn create_document(
        &self,
        collection: &CollectionName,
        fields: &FieldMap,
    ) -> plaudit_core::Result<DocumentId> {
        match self {
            Store::File(store) => store.create_document(collection, fields).await,
            Store::Http(store) => store.create_document(collection, fields).await,
        }
    }

    async fn update_document(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        fields: &FieldMap,
    ) -> plaudit_core::Result<()> {
        match self {
            Store::File(store) => store.update_document(collection, id, fields).await,
            Store::Http(store) => store.update_document(collection, id, fields).await,
        }
    }

    async fn delete_document(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
    ) -> plaudit_core::Result<()> {
        match self {
            Store::File(store) => store.delete_document(collection, id).await,
            Store::Http(store) => store.delete_document(collection, id).await,
        }
    }

    fn watch(&self, collection: &CollectionName) -> plaudit_core::Result<Self::Watch> {
        let inner: Pin<Box<dyn SnapshotStream>> = match self {
            Store::File(store) => Box::pin(store.watch(collection)?),
            Store::Http(store) => Box::pin(store.watch(collection)?),
        };
        Ok(BoxWatch { inner })
    }
}
