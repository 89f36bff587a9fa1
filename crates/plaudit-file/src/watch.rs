//! Watch stream for the file-backed document store.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;

use plaudit_core::error::{Error, InvalidInputError};
use plaudit_core::{CollectionName, Result, Snapshot};

use crate::store::{ChangeLogEntry, FileDocumentStore};

/// Watch stream for the file-backed document store.
///
/// Yields the current snapshot on subscribe, then a fresh snapshot every
/// time the change log records a mutation of the watched collection. The
/// snapshot pump stops as soon as the stream is dropped.
pub struct FileWatch {
    inner: Pin<Box<dyn Stream<Item = Result<Snapshot>> + Send>>,
}

impl FileWatch {
    pub(crate) fn from_store(store: FileDocumentStore, collection: CollectionName) -> Result<Self> {
        let changes_path = store.changes_path();

        std::fs::create_dir_all(store.root()).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("Failed to create store directory: {}", e),
            })
        })?;

        let (snap_tx, mut snap_rx) = mpsc::channel::<Result<Snapshot>>(16);
        // Wake-ups from the filesystem watcher; capacity 1 coalesces bursts.
        let (wake_tx, mut wake_rx) = mpsc::channel::<()>(1);

        let initial_pos = if changes_path.exists() {
            std::fs::metadata(&changes_path)
                .map(|m| m.len())
                .unwrap_or(0)
        } else {
            0
        };

        let position = Arc::new(Mutex::new(initial_pos));

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            if let Ok(event) = res {
                if !matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) {
                    return;
                }

                let is_changes = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().is_some_and(|n| n == "changes.jsonl"));

                if is_changes {
                    let _ = wake_tx.try_send(());
                }
            }
        })
        .map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: format!("Failed to create file watcher: {}", e),
            })
        })?;

        watcher
            .watch(store.root(), RecursiveMode::NonRecursive)
            .map_err(|e| {
                Error::InvalidInput(InvalidInputError::Other {
                    message: format!("Failed to watch directory: {}", e),
                })
            })?;

        tokio::spawn(async move {
            let _watcher = watcher;
            let mut interval = tokio::time::interval(Duration::from_millis(500));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            // Deliver the current contents immediately on subscribe.
            if snap_tx
                .send(store.read_collection(&collection))
                .await
                .is_err()
            {
                return;
            }

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = wake_rx.recv() => {}
                }

                if snap_tx.is_closed() {
                    break;
                }

                if !has_new_changes(&changes_path, &position, &collection) {
                    continue;
                }

                if snap_tx
                    .send(store.read_collection(&collection))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });

        let stream = async_stream::stream! {
            while let Some(snapshot) = snap_rx.recv().await {
                yield snapshot;
            }
        };

        Ok(Self {
            inner: Box::pin(stream),
        })
    }
}

impl Stream for FileWatch {
    type Item = Result<Snapshot>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Advance past new change log entries, reporting whether any touched the
/// watched collection.
fn has_new_changes(
    changes_path: &PathBuf,
    position: &Arc<Mutex<u64>>,
    collection: &CollectionName,
) -> bool {
    let mut relevant = false;

    if let Ok(mut file) = File::open(changes_path) {
        let mut pos = position.lock().unwrap();
        if file.seek(SeekFrom::Start(*pos)).is_ok() {
            let reader = BufReader::new(&file);
            for line in reader.lines().map_while(|line| line.ok()) {
                if line.trim().is_empty() {
                    continue;
                }
                if let Ok(entry) = serde_json::from_str::<ChangeLogEntry>(&line) {
                    if entry.collection == collection.as_str() {
                        relevant = true;
                    }
                }
            }
            if let Ok(new_pos) = file.stream_position() {
                *pos = new_pos;
            }
        }
    }

    relevant
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use plaudit_core::{DocumentStore, FieldMap, StoreUrl};
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::time::timeout;

    fn test_store() -> (TempDir, FileDocumentStore) {
        let dir = TempDir::new().unwrap();
        let url = StoreUrl::new(format!("file://{}", dir.path().display())).unwrap();
        let store = FileDocumentStore::new(dir.path(), url);
        (dir, store)
    }

    fn collection() -> CollectionName {
        CollectionName::new("testimonials").unwrap()
    }

    async fn next_snapshot(watch: &mut FileWatch) -> Snapshot {
        timeout(Duration::from_secs(5), watch.next())
            .await
            .expect("timed out waiting for snapshot")
            .expect("stream ended")
            .expect("snapshot error")
    }

    #[tokio::test]
    async fn initial_snapshot_delivered_on_subscribe() {
        let (_dir, store) = test_store();

        let fields = FieldMap::new(json!({"name": "Ada"})).unwrap();
        store.create_document(&collection(), &fields).await.unwrap();

        let mut watch = store.watch(&collection()).unwrap();
        let snapshot = next_snapshot(&mut watch).await;
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn change_triggers_fresh_snapshot() {
        let (_dir, store) = test_store();

        let mut watch = store.watch(&collection()).unwrap();
        let initial = next_snapshot(&mut watch).await;
        assert!(initial.is_empty());

        let fields = FieldMap::new(json!({"name": "Ada"})).unwrap();
        let id = store.create_document(&collection(), &fields).await.unwrap();

        let snapshot = next_snapshot(&mut watch).await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.docs[0].id, id);
    }

    #[tokio::test]
    async fn changes_in_other_collections_not_delivered() {
        let (_dir, store) = test_store();
        let other = CollectionName::new("drafts").unwrap();

        let mut watch = store.watch(&collection()).unwrap();
        let _ = next_snapshot(&mut watch).await;

        let fields = FieldMap::new(json!({"name": "Ada"})).unwrap();
        store.create_document(&other, &fields).await.unwrap();

        // No snapshot should arrive for the unrelated collection
        let outcome = timeout(Duration::from_millis(1200), watch.next()).await;
        assert!(outcome.is_err(), "unexpected snapshot: {:?}", outcome);
    }

    #[tokio::test]
    async fn delete_delivers_snapshot_without_record() {
        let (_dir, store) = test_store();

        let fields = FieldMap::new(json!({"name": "Ada"})).unwrap();
        let id = store.create_document(&collection(), &fields).await.unwrap();

        let mut watch = store.watch(&collection()).unwrap();
        let initial = next_snapshot(&mut watch).await;
        assert_eq!(initial.len(), 1);

        store.delete_document(&collection(), &id).await.unwrap();

        let snapshot = next_snapshot(&mut watch).await;
        assert!(snapshot.is_empty());
    }
}
