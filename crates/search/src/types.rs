use filefind_store::FileRecord;
use serde::{Deserialize, Serialize};

/// One ranked hit. `score` is squared-L2 distance to the query embedding;
/// lower is closer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub record: FileRecord,
    pub score: f32,
}
