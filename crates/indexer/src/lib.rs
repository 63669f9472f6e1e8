//! # Filefind Indexer
//!
//! Walks directory trees, embeds file names and upserts [`FileRecord`]s into
//! the metadata store.
//!
//! Failure policy: an unreadable file or directory is logged and skipped so
//! the rest of the scan continues; an embedding failure skips that one record
//! and is counted; only a store write failure aborts the operation.
//!
//! [`FileRecord`]: filefind_store::FileRecord

mod error;
mod indexer;
mod scanner;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::Indexer;
pub use scanner::{scan_roots, ScanOutcome};
pub use stats::IndexStats;
