use crate::error::Result;
use crate::types::SearchResult;
use filefind_store::MetadataStore;
use filefind_vector_store::{EmbeddingModel, SimilarityIndex};

/// Entry point for queries. Borrows the store and embedder constructed once
/// at startup.
pub struct SearchEngine<'a> {
    store: &'a MetadataStore,
    embedder: &'a EmbeddingModel,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a MetadataStore, embedder: &'a EmbeddingModel) -> Self {
        Self { store, embedder }
    }

    /// Embed `query` once and snapshot the store into a similarity index.
    ///
    /// An empty store yields a session that returns empty results, not an
    /// error. The snapshot is never mutated afterwards; a new session picks
    /// up later store changes.
    pub fn session(&self, query: &str) -> Result<SearchSession<'a>> {
        let query_vector = self.embedder.embed(query)?;

        let records = self.store.list_all()?;
        let mut index = SimilarityIndex::new(self.embedder.dimension());
        let mut paths = Vec::with_capacity(records.len());
        for record in records {
            if record.embedding.len() != self.embedder.dimension() {
                // Row written by a different model; unusable for this session.
                log::warn!(
                    "Ignoring {} with stale embedding dimension {}",
                    record.path,
                    record.embedding.len()
                );
                continue;
            }
            index.add(paths.len() as u64, &record.embedding)?;
            paths.push(record.path);
        }

        log::debug!("Search session over {} records for '{query}'", paths.len());
        Ok(SearchSession {
            store: self.store,
            index,
            paths,
            query_vector,
        })
    }
}

/// One query's snapshot: cached query vector plus the index built over the
/// store contents at session start.
pub struct SearchSession<'a> {
    store: &'a MetadataStore,
    index: SimilarityIndex,
    paths: Vec<String>,
    query_vector: Vec<f32>,
}

impl SearchSession<'_> {
    /// Top `k` matches, best first. Calling again with a larger `k` returns
    /// the earlier ranking as a prefix ("load more" without re-embedding).
    ///
    /// Hits are resolved through the store at call time; a record deleted
    /// since the snapshot is skipped, never an error.
    pub fn results(&self, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }

        let hits = self.index.search(&self.query_vector, k)?;
        let mut results = Vec::with_capacity(hits.len());
        for (id, score) in hits {
            let path = &self.paths[id as usize];
            match self.store.get_by_path(path)? {
                Some(record) => results.push(SearchResult { record, score }),
                None => log::debug!("{path} vanished since snapshot; skipping"),
            }
        }
        Ok(results)
    }

    /// Page view over the same ranking: skips `offset` hits, returns up to
    /// `page_size`.
    pub fn results_page(&self, offset: usize, page_size: usize) -> Result<Vec<SearchResult>> {
        let upto = offset.saturating_add(page_size);
        let results = self.results(upto)?;
        Ok(results.into_iter().skip(offset).collect())
    }

    /// Number of records in the snapshot.
    pub fn indexed_len(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filefind_store::FileRecord;
    use pretty_assertions::assert_eq;

    fn seed(store: &MetadataStore, embedder: &EmbeddingModel, names: &[&str]) {
        for name in names {
            let embedding = embedder.embed(name).unwrap();
            store
                .upsert(&FileRecord {
                    path: format!("/files/{name}"),
                    name: name.to_string(),
                    size_bytes: 10,
                    modified_at: 1_700_000_000,
                    embedding,
                })
                .unwrap();
        }
    }

    #[test]
    fn exact_name_query_ranks_that_file_first() {
        let store = MetadataStore::open_in_memory().unwrap();
        let embedder = EmbeddingModel::stub();
        seed(&store, &embedder, &["alpha.txt", "beta.txt", "gamma.txt"]);

        let engine = SearchEngine::new(&store, &embedder);
        let session = engine.session("beta.txt").unwrap();
        let results = session.results(3).unwrap();

        assert_eq!(results[0].record.name, "beta.txt");
        assert!(results[0].score.abs() < 1e-5);
    }

    #[test]
    fn budget_query_prefers_budget_report_over_notes() {
        let store = MetadataStore::open_in_memory().unwrap();
        let embedder = EmbeddingModel::stub();
        seed(&store, &embedder, &["budget_report_2023.xlsx", "notes.txt"]);

        let engine = SearchEngine::new(&store, &embedder);
        let session = engine.session("project budget").unwrap();
        let results = session.results(2).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.name, "budget_report_2023.xlsx");
    }

    #[test]
    fn empty_store_returns_empty_results() {
        let store = MetadataStore::open_in_memory().unwrap();
        let embedder = EmbeddingModel::stub();

        let engine = SearchEngine::new(&store, &embedder);
        let session = engine.session("anything at all").unwrap();

        assert_eq!(session.indexed_len(), 0);
        assert!(session.results(10).unwrap().is_empty());
    }

    #[test]
    fn larger_k_keeps_earlier_results_as_prefix() {
        let store = MetadataStore::open_in_memory().unwrap();
        let embedder = EmbeddingModel::stub();
        seed(
            &store,
            &embedder,
            &["one.txt", "two.txt", "three.txt", "four.txt", "five.txt"],
        );

        let engine = SearchEngine::new(&store, &embedder);
        let session = engine.session("two.txt").unwrap();

        let first: Vec<String> = session
            .results(2)
            .unwrap()
            .into_iter()
            .map(|r| r.record.path)
            .collect();
        let more: Vec<String> = session
            .results(5)
            .unwrap()
            .into_iter()
            .map(|r| r.record.path)
            .collect();

        assert_eq!(first, more[..2]);
    }

    #[test]
    fn pagination_offsets_the_same_ranking() {
        let store = MetadataStore::open_in_memory().unwrap();
        let embedder = EmbeddingModel::stub();
        seed(&store, &embedder, &["a.txt", "b.txt", "c.txt", "d.txt"]);

        let engine = SearchEngine::new(&store, &embedder);
        let session = engine.session("a.txt").unwrap();

        let all: Vec<String> = session
            .results(4)
            .unwrap()
            .into_iter()
            .map(|r| r.record.path)
            .collect();
        let page: Vec<String> = session
            .results_page(2, 2)
            .unwrap()
            .into_iter()
            .map(|r| r.record.path)
            .collect();

        assert_eq!(page, all[2..]);
    }

    #[test]
    fn record_deleted_after_snapshot_is_skipped() {
        let store = MetadataStore::open_in_memory().unwrap();
        let embedder = EmbeddingModel::stub();
        seed(&store, &embedder, &["keep.txt", "drop.txt"]);

        let engine = SearchEngine::new(&store, &embedder);
        let session = engine.session("drop.txt").unwrap();
        store.remove("/files/drop.txt").unwrap();

        let results = session.results(2).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.name, "keep.txt");
    }

    #[test]
    fn rows_with_foreign_dimension_are_ignored() {
        let store = MetadataStore::open_in_memory().unwrap();
        let embedder = EmbeddingModel::stub();
        seed(&store, &embedder, &["good.txt"]);
        store
            .upsert(&FileRecord {
                path: "/files/stale.bin".to_string(),
                name: "stale.bin".to_string(),
                size_bytes: 1,
                modified_at: 0,
                embedding: vec![1.0, 2.0],
            })
            .unwrap();

        let engine = SearchEngine::new(&store, &embedder);
        let session = engine.session("good.txt").unwrap();

        assert_eq!(session.indexed_len(), 1);
        let results = session.results(5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.name, "good.txt");
    }
}
