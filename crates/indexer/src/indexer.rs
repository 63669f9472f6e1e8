use crate::error::Result;
use crate::scanner::scan_roots;
use crate::stats::IndexStats;
use filefind_store::{FileRecord, MetadataStore};
use filefind_vector_store::EmbeddingModel;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Instant, UNIX_EPOCH};

/// Names per embedding call. Batching amortizes model overhead; order within
/// a batch is preserved by the embedder.
const EMBED_BATCH_SIZE: usize = 64;

/// Metadata gathered before embedding, one per accepted file.
struct PendingFile {
    path: String,
    name: String,
    size_bytes: u64,
    modified_at: i64,
}

/// Walks roots, embeds file names and upserts records into the store.
///
/// Holds borrowed context constructed once at startup; no process-wide state.
pub struct Indexer<'a> {
    store: &'a MetadataStore,
    embedder: &'a EmbeddingModel,
}

impl<'a> Indexer<'a> {
    pub fn new(store: &'a MetadataStore, embedder: &'a EmbeddingModel) -> Self {
        Self { store, embedder }
    }

    /// Index every regular file beneath the given roots.
    ///
    /// Returns counters for the run. Only a store write failure is fatal;
    /// unreadable paths and embedding failures are counted and skipped.
    pub fn index_roots(&self, roots: &[impl AsRef<Path>]) -> Result<IndexStats> {
        let started = Instant::now();
        let mut stats = IndexStats::new();

        let outcome = scan_roots(roots);
        stats.files_skipped += outcome.skipped;

        let mut pending = Vec::with_capacity(outcome.files.len());
        for path in outcome.files {
            match stat_file(&path) {
                Ok(meta) => pending.push(meta),
                Err(e) => {
                    log::warn!("Skipping {}: {e}", path.display());
                    stats.files_skipped += 1;
                }
            }
        }

        for batch in pending.chunks(EMBED_BATCH_SIZE) {
            self.upsert_batch(batch, &mut stats)?;
        }

        stats.time_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "Indexed {} files ({} skipped, {} embedding failures) in {} ms",
            stats.files_indexed,
            stats.files_skipped,
            stats.embed_failures,
            stats.time_ms
        );
        Ok(stats)
    }

    fn upsert_batch(&self, batch: &[PendingFile], stats: &mut IndexStats) -> Result<()> {
        let names: Vec<String> = batch.iter().map(|f| f.name.clone()).collect();
        match self.embedder.embed_batch(&names) {
            Ok(vectors) => {
                for (file, embedding) in batch.iter().zip(vectors) {
                    self.store.upsert(&record(file, embedding))?;
                    stats.files_indexed += 1;
                }
            }
            Err(e) => {
                // One bad input in the batch must not take down its siblings.
                log::warn!("Batch embedding failed ({e}), retrying names individually");
                for file in batch {
                    match self.embedder.embed(&file.name) {
                        Ok(embedding) => {
                            self.store.upsert(&record(file, embedding))?;
                            stats.files_indexed += 1;
                        }
                        Err(e) => {
                            log::warn!("Could not embed '{}': {e}", file.name);
                            stats.embed_failures += 1;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn record(file: &PendingFile, embedding: Vec<f32>) -> FileRecord {
    FileRecord {
        path: file.path.clone(),
        name: file.name.clone(),
        size_bytes: file.size_bytes,
        modified_at: file.modified_at,
        embedding,
    }
}

fn stat_file(path: &PathBuf) -> io::Result<PendingFile> {
    let metadata = fs::metadata(path)?;
    let absolute = fs::canonicalize(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "path has no file name"))?;

    let modified_at = match metadata.modified()?.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    };

    Ok(PendingFile {
        path: absolute.to_string_lossy().into_owned(),
        name,
        size_bytes: metadata.len(),
        modified_at,
    })
}
