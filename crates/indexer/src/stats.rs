use serde::{Deserialize, Serialize};

/// Counters reported after an indexing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Records written to the store
    pub files_indexed: usize,

    /// Entries skipped (unreadable paths, failed stat calls)
    pub files_skipped: usize,

    /// Files whose name could not be embedded
    pub embed_failures: usize,

    /// Wall time of the run in milliseconds
    pub time_ms: u64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }
}
