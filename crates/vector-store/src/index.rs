use crate::error::{Result, VectorStoreError};

/// Squared Euclidean distance. Lower is closer.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Exact nearest-neighbor index over squared-L2 distance.
///
/// Brute-force scan, so recall is 1.0 (no approximation). Entries keep their
/// insertion order and equidistant hits are returned in that order, which
/// makes rankings reproducible across rebuilds from the same record sequence.
///
/// Snapshot semantics: build fully, then query; never mutate while querying.
pub struct SimilarityIndex {
    dimension: usize,
    entries: Vec<(u64, Vec<f32>)>,
}

impl SimilarityIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Add a vector under a caller-chosen identifier.
    pub fn add(&mut self, id: u64, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.entries.push((id, vector.to_vec()));
        Ok(())
    }

    /// The `k` identifiers closest to `query`, best first.
    ///
    /// Stable sort on distance, so ties resolve to insertion order. Asking for
    /// `k` then `k + m` returns the first ranking as a prefix of the second.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>> {
        if query.len() != self.dimension {
            return Err(VectorStoreError::InvalidDimension {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(u64, f32)> = self
            .entries
            .iter()
            .map(|(id, vector)| (*id, squared_l2(query, vector)))
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
