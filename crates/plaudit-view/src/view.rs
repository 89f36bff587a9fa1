//! Synchronized view controller.
//!
//! [`TestimonialView`] owns the in-memory testimonial list and keeps it
//! consistent with a store subscription: snapshots replace the cache
//! wholesale, comment appends apply optimistically before the store
//! confirms, and creation/deletion wait for the next snapshot.

use std::collections::HashMap;

use serde_json::json;
use tracing::{debug, warn};

use plaudit_core::{CollectionName, DocumentId, DocumentStore, FieldMap, Result, Snapshot};

use crate::testimonial::{FIELD_COMMENTS, Testimonial, TestimonialDraft};

/// The synchronized view over a testimonial collection.
///
/// State is mutated from exactly two places: [`apply_snapshot`] (wholesale
/// replace) and the optimistic comment append inside [`append_comment`].
/// All mutation happens through `&mut self` on one logical task, so an
/// optimistic append always lands before the remote call suspends.
///
/// A snapshot may overwrite optimistic state that the store never
/// persisted; the divergence window is bounded by the next snapshot
/// delivery. That is an accepted tradeoff of this design.
///
/// [`apply_snapshot`]: TestimonialView::apply_snapshot
/// [`append_comment`]: TestimonialView::append_comment
pub struct TestimonialView<S> {
    store: S,
    collection: CollectionName,
    records: Vec<Testimonial>,
    draft: TestimonialDraft,
    comment_drafts: HashMap<DocumentId, String>,
    /// Last-confirmed comment sequence per in-flight optimistic append.
    pending: HashMap<DocumentId, Vec<String>>,
}

impl<S: DocumentStore> TestimonialView<S> {
    /// Create a view over the given collection, initially empty.
    pub fn new(store: S, collection: CollectionName) -> Self {
        Self {
            store,
            collection,
            records: Vec::new(),
            draft: TestimonialDraft::default(),
            comment_drafts: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// The collection this view is bound to.
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The cached records, in the order the latest snapshot delivered them.
    pub fn records(&self) -> &[Testimonial] {
        &self.records
    }

    /// Look up a cached record by id.
    pub fn find(&self, id: &DocumentId) -> Option<&Testimonial> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// The pending new-testimonial form.
    pub fn draft(&self) -> &TestimonialDraft {
        &self.draft
    }

    /// Mutable access to the pending new-testimonial form.
    pub fn draft_mut(&mut self) -> &mut TestimonialDraft {
        &mut self.draft
    }

    /// The pending comment text for a record.
    ///
    /// Comment drafts are keyed by record id, so typing into one record's
    /// input can never attach to another record.
    pub fn comment_draft(&self, id: &DocumentId) -> &str {
        self.comment_drafts.get(id).map(String::as_str).unwrap_or("")
    }

    /// Set the pending comment text for a record.
    pub fn set_comment_draft(&mut self, id: &DocumentId, text: impl Into<String>) {
        self.comment_drafts.insert(id.clone(), text.into());
    }

    /// Open the standing subscription for this view's collection.
    ///
    /// The caller feeds each delivered snapshot into [`apply_snapshot`];
    /// dropping the stream tears the subscription down exactly once, after
    /// which no further snapshots (and hence no further cache
    /// replacements) occur.
    ///
    /// [`apply_snapshot`]: TestimonialView::apply_snapshot
    pub fn watch(&self) -> Result<S::Watch> {
        self.store.watch(&self.collection)
    }

    /// Replace the cache wholesale with the snapshot contents.
    ///
    /// Display order is snapshot order. Documents without the testimonial
    /// shape are skipped. The snapshot is authoritative: all
    /// pending-confirmation markers are dropped, and comment drafts for
    /// records no longer present are discarded.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.records = snapshot
            .iter()
            .filter_map(Testimonial::from_document)
            .collect();
        self.pending.clear();
        let records = &self.records;
        self.comment_drafts
            .retain(|id, _| records.iter().any(|r| &r.id == id));
    }

    /// Submit the current draft as a new testimonial.
    ///
    /// Fails synchronously with [`Error::EmptyField`] if a required field
    /// is empty after trimming: no store command is issued and no state
    /// changes.
    /// On valid input, issues exactly one create command and clears the
    /// draft whether or not the store accepts it; a store failure is
    /// logged and otherwise swallowed. The new record is not inserted
    /// locally; it appears with the next snapshot.
    ///
    /// [`Error::EmptyField`]: plaudit_core::Error::EmptyField
    pub async fn submit(&mut self) -> Result<()> {
        self.draft.validate()?;

        let draft = std::mem::take(&mut self.draft);

        match self
            .store
            .create_document(&self.collection, &draft.to_fields())
            .await
        {
            Ok(id) => {
                debug!(%id, "Submitted testimonial");
            }
            Err(e) => {
                warn!(error = %e, "Failed to submit testimonial");
            }
        }

        Ok(())
    }

    /// Append the record's pending comment draft to its comment sequence.
    ///
    /// A silent no-op when `id` is not in the cache. Otherwise the comment
    /// draft is taken immediately, the cached record gains the comment
    /// before the store call suspends, and exactly one update command
    /// carrying the full new sequence is issued. If the store rejects the
    /// update, the optimistic append is reverted to the last-confirmed
    /// sequence, unless a snapshot has replaced the cache in the meantime,
    /// in which case the snapshot stands.
    pub async fn append_comment(&mut self, id: &DocumentId) -> Result<()> {
        let Some(comments) = self.begin_comment_append(id) else {
            return Ok(());
        };

        let fields = FieldMap::empty().with_field(FIELD_COMMENTS, json!(comments));
        let outcome = self
            .store
            .update_document(&self.collection, id, &fields)
            .await;
        self.resolve_comment_append(id, outcome);

        Ok(())
    }

    /// Issue a delete command for the record.
    ///
    /// No optimistic local removal: the record stays in the cache until a
    /// snapshot omits it. A store failure is logged and otherwise
    /// swallowed.
    pub async fn delete(&mut self, id: &DocumentId) -> Result<()> {
        if let Err(e) = self.store.delete_document(&self.collection, id).await {
            warn!(%id, error = %e, "Failed to delete testimonial");
        }

        Ok(())
    }

    /// Apply the optimistic half of a comment append.
    ///
    /// Takes the record's comment draft, appends it to the cached record,
    /// and records the prior sequence as the pending-confirmation marker.
    /// Returns the full new sequence for the update command, or `None`
    /// when the record is not cached (the draft is still discarded, as
    /// there is no record to attach it to).
    fn begin_comment_append(&mut self, id: &DocumentId) -> Option<Vec<String>> {
        let text = self.comment_drafts.remove(id);

        let record = self.records.iter_mut().find(|r| &r.id == id)?;
        let text = text.unwrap_or_default();

        let prior = record.comments.clone();
        record.comments.push(text);
        let comments = record.comments.clone();

        self.pending.insert(id.clone(), prior);

        Some(comments)
    }

    /// Apply the confirmation half of a comment append.
    ///
    /// On success the pending marker is dropped. On failure the record's
    /// comments revert to the last-confirmed sequence, unless a snapshot
    /// cleared the marker first; the snapshot is authoritative.
    fn resolve_comment_append(&mut self, id: &DocumentId, outcome: Result<()>) {
        match outcome {
            Ok(()) => {
                self.pending.remove(id);
            }
            Err(e) => {
                warn!(%id, error = %e, "Failed to append comment");
                if let Some(prior) = self.pending.remove(id) {
                    if let Some(record) = self.records.iter_mut().find(|r| &r.id == id) {
                        record.comments = prior;
                    }
                }
            }
        }
    }
}
