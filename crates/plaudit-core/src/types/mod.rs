//! Core plaudit types.
//!
//! These types enforce store invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod collection;
mod document_id;
mod store_url;

pub use collection::CollectionName;
pub use document_id::DocumentId;
pub use store_url::StoreUrl;
