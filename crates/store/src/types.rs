use serde::{Deserialize, Serialize};

/// One indexed file. Keyed by absolute path; re-indexing upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path, unique within the store
    pub path: String,

    /// File name (final path component), the text that gets embedded
    pub name: String,

    /// File size in bytes
    pub size_bytes: u64,

    /// Last-modified time, unix seconds
    pub modified_at: i64,

    /// Fixed-length embedding of `name`
    pub embedding: Vec<f32>,
}
