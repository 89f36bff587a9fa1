//! Document and snapshot types.

use serde::{Deserialize, Serialize};

use crate::types::DocumentId;

use super::FieldMap;

/// A document from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The store-assigned id of this document.
    pub id: DocumentId,

    /// The document fields.
    ///
    /// Guaranteed to be a JSON object. This is schema-agnostic;
    /// interpretation is left to higher layers.
    pub fields: FieldMap,
}

/// A complete listing of all documents in a collection at a point in time.
///
/// Snapshots are delivered by the store's subscription mechanism in place
/// of incremental diffs. Document order is store-defined and not
/// guaranteed stable across snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The documents in the collection.
    pub docs: Vec<Document>,
}

impl Snapshot {
    /// Returns the number of documents in the snapshot.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns true if the snapshot holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Iterate over the documents in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }
}

impl IntoIterator for Snapshot {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.into_iter()
    }
}

impl FromIterator<Document> for Snapshot {
    fn from_iter<T: IntoIterator<Item = Document>>(iter: T) -> Self {
        Self {
            docs: iter.into_iter().collect(),
        }
    }
}
