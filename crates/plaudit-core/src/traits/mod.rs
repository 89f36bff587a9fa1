//! Core traits for document store behavior.

mod store;
mod watch;

pub use store::DocumentStore;
pub use watch::SnapshotStream;
