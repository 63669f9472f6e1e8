//! # Filefind Vector Store
//!
//! Embedding generation and in-memory similarity search for file names.
//!
//! - **Embeddings** via FastEmbed (`all-MiniLM-L6-v2`, 384 dimensions), with a
//!   deterministic stub backend for offline tests
//!   (`FILEFIND_EMBEDDING_MODE=stub`)
//! - **Exact nearest-neighbor search** over squared-L2 distance, brute force,
//!   ties broken by insertion order
//!
//! The index is ephemeral: it is rebuilt from the metadata store for each
//! search session and never persisted.

mod embeddings;
mod error;
mod index;

pub use embeddings::{EmbeddingModel, EMBEDDING_DIMENSION};
pub use error::{Result, VectorStoreError};
pub use index::{squared_l2, SimilarityIndex};
