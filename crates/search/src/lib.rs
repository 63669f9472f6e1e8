//! # Filefind Search
//!
//! Search orchestration: embed a query once, snapshot the store into a fresh
//! similarity index and page through ranked [`SearchResult`]s.
//!
//! A [`SearchSession`] caches the query vector, so "load more" asks the same
//! index for a larger k without re-embedding. Results are resolved through
//! the store at call time and records deleted since the snapshot are skipped.

mod engine;
mod error;
pub mod tokens;
mod types;

pub use engine::{SearchEngine, SearchSession};
pub use error::{Result, SearchError};
pub use types::SearchResult;
