//! # Filefind Store
//!
//! Durable metadata store for indexed files, backed by a single SQLite file.
//!
//! One row per unique absolute path: name, size, modified time and the
//! file-name embedding serialized as a little-endian f32 blob. Re-indexing a
//! path updates the existing row instead of duplicating it.
//!
//! The store is single-process, single-writer. The similarity index is NOT
//! persisted here; it is rebuilt from [`MetadataStore::list_all`] each run.

mod error;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use store::MetadataStore;
pub use types::FileRecord;
