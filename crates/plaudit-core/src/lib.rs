//! plaudit-core - Core document store types and traits.

pub mod document;
pub mod error;
pub mod traits;
pub mod types;

pub use document::{Document, FieldMap, Snapshot};
pub use error::Error;
pub use traits::{DocumentStore, SnapshotStream};
pub use types::{CollectionName, DocumentId, StoreUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
