//! Filesystem storage for the file-backed document store.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use plaudit_core::error::{Error, InvalidInputError, ProtocolError, TransportError};
use plaudit_core::{
    CollectionName, Document, DocumentId, DocumentStore, FieldMap, Result, Snapshot, StoreUrl,
};

use crate::watch::FileWatch;

fn map_io(err: std::io::Error) -> Error {
    Error::Transport(TransportError::Http {
        message: format!("IO error: {}", err),
    })
}

fn map_json(err: serde_json::Error) -> Error {
    Error::InvalidInput(InvalidInputError::Other {
        message: err.to_string(),
    })
}

/// An entry in the change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChangeLogEntry {
    /// The collection the change applies to.
    pub collection: String,
    /// The id of the affected document.
    pub id: String,
    /// ISO 8601 timestamp.
    pub time: String,
    /// The operation type.
    pub op: ChangeLogOp,
}

/// The type of logged change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ChangeLogOp {
    /// A document was created.
    Create,
    /// A document was updated.
    Update,
    /// A document was deleted.
    Delete,
}

/// Filesystem-backed document store.
///
/// Documents live as one JSON file per document under
/// `<root>/collections/<collection>/<id>.json`. Every mutation appends an
/// entry to `<root>/changes.jsonl`, which watch streams tail to learn when
/// to deliver a fresh snapshot.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    root: PathBuf,
    url: StoreUrl,
}

impl FileDocumentStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>, url: StoreUrl) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            url,
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the collections directory.
    fn collections_dir(&self) -> PathBuf {
        self.root.join("collections")
    }

    /// Get the directory for a specific collection.
    fn collection_dir(&self, collection: &CollectionName) -> PathBuf {
        self.collections_dir().join(collection.as_str())
    }

    /// Get the path for a specific document.
    fn document_path(&self, collection: &CollectionName, id: &DocumentId) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{}.json", id.as_str()))
    }

    /// Get the change log path.
    pub(crate) fn changes_path(&self) -> PathBuf {
        self.root.join("changes.jsonl")
    }

    /// Get the change log lock file path.
    fn changes_lock_path(&self) -> PathBuf {
        self.root.join("changes.lock")
    }

    /// Generate a new document id.
    fn generate_id(&self) -> Result<DocumentId> {
        let uuid_str = Uuid::new_v4().to_string().replace("-", "");
        DocumentId::new(uuid_str)
    }

    /// Resolve server-timestamp sentinels in a field map to the current time.
    fn resolve_server_timestamps(fields: &FieldMap) -> Value {
        let now = Utc::now().to_rfc3339();
        let mut resolved = fields.as_value().clone();
        if let Some(obj) = resolved.as_object_mut() {
            for value in obj.values_mut() {
                if FieldMap::is_server_timestamp(value) {
                    *value = Value::String(now.clone());
                }
            }
        }
        resolved
    }

    /// Append an entry to the change log.
    fn append_change(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        op: ChangeLogOp,
    ) -> Result<()> {
        let changes_path = self.changes_path();
        let lock_path = self.changes_lock_path();

        if let Some(parent) = changes_path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(map_io)?;

        lock_file.lock_exclusive().map_err(map_io)?;

        let entry = ChangeLogEntry {
            collection: collection.as_str().to_string(),
            id: id.as_str().to_string(),
            time: Utc::now().to_rfc3339(),
            op,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&changes_path)
            .map_err(map_io)?;

        let line = serde_json::to_string(&entry).map_err(map_json)?;

        writeln!(file, "{}", line).map_err(map_io)?;
        file.sync_data().map_err(map_io)?;

        lock_file.unlock().map_err(map_io)?;

        Ok(())
    }

    /// Write a document file atomically.
    fn write_document(&self, path: &Path, fields: &Value) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let content = serde_json::to_string_pretty(fields).map_err(map_json)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content).map_err(map_io)?;
        fs::rename(&temp_path, path).map_err(map_io)?;

        Ok(())
    }

    /// Read the full current contents of a collection.
    ///
    /// Files that fail to parse are skipped with a warning. Listing order
    /// is file-name order; subscribers must not rely on it.
    pub(crate) fn read_collection(&self, collection: &CollectionName) -> Result<Snapshot> {
        let dir = self.collection_dir(collection);

        let mut docs = Vec::new();

        if dir.exists() {
            let mut entries: Vec<_> = fs::read_dir(&dir)
                .map_err(map_io)?
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                .collect();

            entries.sort_by_key(|e| e.file_name());

            for entry in entries {
                let id = entry
                    .path()
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("")
                    .to_string();

                let id = match DocumentId::new(&id) {
                    Ok(id) => id,
                    Err(_) => continue,
                };

                let content = fs::read_to_string(entry.path()).map_err(map_io)?;
                match serde_json::from_str::<FieldMap>(&content) {
                    Ok(fields) => docs.push(Document { id, fields }),
                    Err(e) => {
                        warn!(id = %id, error = %e, "Skipping unreadable document file");
                    }
                }
            }
        }

        Ok(Snapshot { docs })
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    type Watch = FileWatch;

    fn url(&self) -> &StoreUrl {
        &self.url
    }

    #[instrument(skip(self, fields), fields(%collection))]
    async fn create_document(
        &self,
        collection: &CollectionName,
        fields: &FieldMap,
    ) -> Result<DocumentId> {
        let id = self.generate_id()?;
        let path = self.document_path(collection, &id);

        let resolved = Self::resolve_server_timestamps(fields);
        self.write_document(&path, &resolved)?;

        self.append_change(collection, &id, ChangeLogOp::Create)?;

        debug!(id = %id, "Created document");

        Ok(id)
    }

    #[instrument(skip(self, fields), fields(%collection, %id))]
    async fn update_document(
        &self,
        collection: &CollectionName,
        id: &DocumentId,
        fields: &FieldMap,
    ) -> Result<()> {
        let path = self.document_path(collection, id);

        if !path.exists() {
            return Err(Error::Protocol(ProtocolError::new(
                404,
                Some("DocumentNotFound".to_string()),
                Some(format!("Document {}/{} not found", collection, id)),
            )));
        }

        let content = fs::read_to_string(&path).map_err(map_io)?;
        let mut current: Value = serde_json::from_str(&content).map_err(map_json)?;

        let resolved = Self::resolve_server_timestamps(fields);
        if let (Some(current_obj), Some(new_obj)) =
            (current.as_object_mut(), resolved.as_object())
        {
            for (key, value) in new_obj {
                current_obj.insert(key.clone(), value.clone());
            }
        }

        self.write_document(&path, &current)?;

        self.append_change(collection, id, ChangeLogOp::Update)?;

        debug!("Updated document");

        Ok(())
    }

    #[instrument(skip(self), fields(%collection, %id))]
    async fn delete_document(&self, collection: &CollectionName, id: &DocumentId) -> Result<()> {
        let path = self.document_path(collection, id);

        if path.exists() {
            fs::remove_file(&path).map_err(map_io)?;

            self.append_change(collection, id, ChangeLogOp::Delete)?;

            debug!("Deleted document");
        }

        Ok(())
    }

    fn watch(&self, collection: &CollectionName) -> Result<Self::Watch> {
        FileWatch::from_store(self.clone(), collection.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, FileDocumentStore) {
        let dir = TempDir::new().unwrap();
        let url = StoreUrl::new(format!("file://{}", dir.path().display())).unwrap();
        let store = FileDocumentStore::new(dir.path(), url);
        (dir, store)
    }

    fn collection() -> CollectionName {
        CollectionName::new("testimonials").unwrap()
    }

    #[tokio::test]
    async fn create_then_read_back() {
        let (_dir, store) = test_store();

        let fields = FieldMap::new(json!({
            "name": "Ada",
            "position": "Engineer",
            "testimonial": "Great to work with.",
            "comments": [],
        }))
        .unwrap();

        let id = store.create_document(&collection(), &fields).await.unwrap();

        let snapshot = store.read_collection(&collection()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.docs[0].id, id);
        assert_eq!(snapshot.docs[0].fields.get("name").unwrap(), "Ada");
    }

    #[tokio::test]
    async fn create_resolves_server_timestamp() {
        let (_dir, store) = test_store();

        let fields = FieldMap::empty()
            .with_field("name", json!("Ada"))
            .with_server_timestamp("createdAt");

        store.create_document(&collection(), &fields).await.unwrap();

        let snapshot = store.read_collection(&collection()).unwrap();
        let created_at = snapshot.docs[0].fields.get("createdAt").unwrap();
        let created_at = created_at.as_str().expect("createdAt should be a string");
        assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
    }

    #[tokio::test]
    async fn update_replaces_only_named_fields() {
        let (_dir, store) = test_store();

        let fields = FieldMap::new(json!({
            "name": "Ada",
            "comments": [],
        }))
        .unwrap();
        let id = store.create_document(&collection(), &fields).await.unwrap();

        let patch = FieldMap::new(json!({"comments": ["first"]})).unwrap();
        store
            .update_document(&collection(), &id, &patch)
            .await
            .unwrap();

        let snapshot = store.read_collection(&collection()).unwrap();
        assert_eq!(snapshot.docs[0].fields.get("name").unwrap(), "Ada");
        assert_eq!(
            snapshot.docs[0].fields.get("comments").unwrap(),
            &json!(["first"])
        );
    }

    #[tokio::test]
    async fn update_missing_document_fails() {
        let (_dir, store) = test_store();

        let id = DocumentId::new("missing").unwrap();
        let patch = FieldMap::new(json!({"comments": []})).unwrap();
        let err = store
            .update_document(&collection(), &id, &patch)
            .await
            .unwrap_err();

        match err {
            Error::Protocol(e) => assert!(e.is_not_found()),
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = test_store();

        let fields = FieldMap::new(json!({"name": "Ada"})).unwrap();
        let id = store.create_document(&collection(), &fields).await.unwrap();

        store.delete_document(&collection(), &id).await.unwrap();
        assert!(store.read_collection(&collection()).unwrap().is_empty());

        // Second delete of an absent document succeeds
        store.delete_document(&collection(), &id).await.unwrap();
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let (_dir, store) = test_store();

        let fields = FieldMap::new(json!({"name": "Ada"})).unwrap();
        let a = store.create_document(&collection(), &fields).await.unwrap();
        let b = store.create_document(&collection(), &fields).await.unwrap();
        assert_ne!(a, b);
    }
}
