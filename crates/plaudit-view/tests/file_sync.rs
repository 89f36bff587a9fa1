//! View controller tests against the file-backed store.
//!
//! These drive the full subscription loop: mutate through the controller,
//! receive snapshots from the store watch, and apply them back.

use std::time::Duration;

use futures_util::StreamExt;
use tempfile::TempDir;
use tokio::time::timeout;

use plaudit_core::{CollectionName, DocumentStore, Snapshot, SnapshotStream, StoreUrl};
use plaudit_file::FileDocumentStore;
use plaudit_view::{TestimonialDraft, TestimonialView};

fn test_store() -> (TempDir, FileDocumentStore) {
    let dir = TempDir::new().unwrap();
    let url = StoreUrl::new(format!("file://{}", dir.path().display())).unwrap();
    let store = FileDocumentStore::new(dir.path(), url);
    (dir, store)
}

fn collection() -> CollectionName {
    CollectionName::new("testimonials").unwrap()
}

async fn next_snapshot<W: SnapshotStream + Unpin>(watch: &mut W) -> Snapshot {
    timeout(Duration::from_secs(5), watch.next())
        .await
        .expect("timed out waiting for snapshot")
        .expect("stream ended")
        .expect("snapshot error")
}

#[tokio::test]
async fn record_lifecycle_through_the_view() {
    let (_dir, store) = test_store();
    let mut view = TestimonialView::new(store, collection());

    let mut watch = view.watch().unwrap();
    let initial = next_snapshot(&mut watch).await;
    view.apply_snapshot(initial);
    assert!(view.records().is_empty());

    // Submit: the record reaches the cache only via the next snapshot
    *view.draft_mut() = TestimonialDraft::new("Ada", "Engineer", "Great to work with.");
    view.submit().await.unwrap();
    assert!(view.records().is_empty());

    let snapshot = next_snapshot(&mut watch).await;
    view.apply_snapshot(snapshot);
    assert_eq!(view.records().len(), 1);
    let record = &view.records()[0];
    assert_eq!(record.name, "Ada");
    assert!(record.comments.is_empty());
    assert!(record.created_at.is_some(), "store assigns createdAt");

    // Comment: applied locally at once, confirmed by the next snapshot
    let id = record.id.clone();
    view.set_comment_draft(&id, "agreed");
    view.append_comment(&id).await.unwrap();
    assert_eq!(view.find(&id).unwrap().comments, vec!["agreed"]);

    let snapshot = next_snapshot(&mut watch).await;
    view.apply_snapshot(snapshot);
    assert_eq!(view.find(&id).unwrap().comments, vec!["agreed"]);

    // Delete: stays visible until a snapshot omits it
    view.delete(&id).await.unwrap();
    assert_eq!(view.records().len(), 1);

    let snapshot = next_snapshot(&mut watch).await;
    view.apply_snapshot(snapshot);
    assert!(view.records().is_empty());
}

#[tokio::test]
async fn unsubscribed_view_sees_no_further_changes() {
    let (_dir, store) = test_store();
    let mut view = TestimonialView::new(store.clone(), collection());

    let mut watch = view.watch().unwrap();
    view.apply_snapshot(next_snapshot(&mut watch).await);
    assert!(view.records().is_empty());

    // Tear the subscription down
    drop(watch);

    // Another client writes after the unsubscribe
    *view.draft_mut() = TestimonialDraft::new("Ada", "Engineer", "Great to work with.");
    view.submit().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1200)).await;

    // The store holds the record (a fresh subscription sees it), but the
    // unsubscribed view never did
    let mut fresh = store.watch(&collection()).unwrap();
    assert_eq!(next_snapshot(&mut fresh).await.len(), 1);
    assert!(view.records().is_empty());
}

#[tokio::test]
async fn two_views_converge_through_snapshots() {
    let (_dir, store) = test_store();
    let mut writer = TestimonialView::new(store.clone(), collection());
    let mut reader = TestimonialView::new(store, collection());

    let mut reader_watch = reader.watch().unwrap();
    reader.apply_snapshot(next_snapshot(&mut reader_watch).await);

    *writer.draft_mut() = TestimonialDraft::new("Grace", "Admiral", "Brilliant colleague.");
    writer.submit().await.unwrap();

    // The other client's write arrives via the reader's subscription
    reader.apply_snapshot(next_snapshot(&mut reader_watch).await);
    assert_eq!(reader.records().len(), 1);
    assert_eq!(reader.records()[0].name, "Grace");
}
