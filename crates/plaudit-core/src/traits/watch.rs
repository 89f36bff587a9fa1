//! Snapshot stream trait.

use futures_core::Stream;

use crate::document::Snapshot;
use crate::Result;

/// Stream of whole-collection snapshots from a store subscription.
pub trait SnapshotStream: Stream<Item = Result<Snapshot>> + Send {}

impl<T> SnapshotStream for T where T: Stream<Item = Result<Snapshot>> + Send {}
