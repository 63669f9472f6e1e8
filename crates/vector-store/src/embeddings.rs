use crate::error::{Result, VectorStoreError};
use fastembed::{EmbeddingModel as FastembedModel, InitOptions, TextEmbedding};
use std::env;

/// Dimensionality of all embeddings in the system, fixed by the model
/// (`all-MiniLM-L6-v2`). The stub backend uses the same value so vectors from
/// either backend fit the same index.
pub const EMBEDDING_DIMENSION: usize = 384;

const MODE_ENV_VAR: &str = "FILEFIND_EMBEDDING_MODE";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum EmbeddingMode {
    Fast,
    Stub,
}

impl EmbeddingMode {
    fn from_env() -> Result<Self> {
        let raw = env::var(MODE_ENV_VAR)
            .unwrap_or_else(|_| "fast".to_string())
            .to_ascii_lowercase();
        match raw.as_str() {
            "fast" => Ok(Self::Fast),
            "stub" => Ok(Self::Stub),
            other => Err(VectorStoreError::Embedding(format!(
                "Unsupported {MODE_ENV_VAR} '{other}' (expected 'fast' or 'stub')"
            ))),
        }
    }
}

enum Backend {
    Fast(TextEmbedding),
    Stub,
}

/// Converts text into fixed-length vectors.
///
/// Deterministic for identical input within a process run; batch output order
/// equals input order. The `fast` backend downloads model assets on first use;
/// the `stub` backend is a hash-seeded generator for offline tests that still
/// scores shared tokens as similar.
pub struct EmbeddingModel {
    backend: Backend,
    dimension: usize,
}

impl EmbeddingModel {
    /// Backend selected by `FILEFIND_EMBEDDING_MODE` (`fast` default, `stub`).
    pub fn new() -> Result<Self> {
        match EmbeddingMode::from_env()? {
            EmbeddingMode::Fast => Self::fast(),
            EmbeddingMode::Stub => Ok(Self::stub()),
        }
    }

    fn fast() -> Result<Self> {
        log::info!("Loading embedding model (all-MiniLM-L6-v2)");
        let model = TextEmbedding::try_new(
            InitOptions::new(FastembedModel::AllMiniLML6V2).with_show_download_progress(false),
        )
        .map_err(|e| VectorStoreError::Embedding(e.to_string()))?;
        Ok(Self {
            backend: Backend::Fast(model),
            dimension: EMBEDDING_DIMENSION,
        })
    }

    /// Deterministic offline backend, used directly by tests.
    pub fn stub() -> Self {
        Self {
            backend: Backend::Stub,
            dimension: EMBEDDING_DIMENSION,
        }
    }

    /// Fixed for the lifetime of the process.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed a single string.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| VectorStoreError::Embedding("Empty embedding batch result".to_string()))
    }

    /// Embed many strings. Output order equals input order.
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = match &self.backend {
            Backend::Fast(model) => model
                .embed(texts.to_vec(), None)
                .map_err(|e| VectorStoreError::Embedding(e.to_string()))?,
            Backend::Stub => texts
                .iter()
                .map(|text| stub_embed(text, self.dimension))
                .collect(),
        };

        if vectors.len() != texts.len() {
            return Err(VectorStoreError::Embedding(format!(
                "Batch returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

/// Deterministic pseudo-embedding: the normalized sum of one hash-seeded unit
/// vector per lowercase alphanumeric token. Texts sharing tokens land close
/// together, which keeps ranking tests meaningful without the real model.
fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut sum = vec![0.0_f32; dimension];
    let mut tokens = 0usize;
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let lowered = token.to_ascii_lowercase();
        accumulate_token(&mut sum, &lowered);
        tokens += 1;
    }
    if tokens == 0 {
        accumulate_token(&mut sum, text);
    }
    normalize(&mut sum);
    sum
}

fn accumulate_token(sum: &mut [f32], token: &str) {
    let mut state =
        fnv1a_64(token.as_bytes()) ^ (sum.len() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for slot in sum.iter_mut() {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        *slot += unit.mul_add(2.0, -1.0);
    }
}

fn normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vec.iter_mut() {
            *value /= norm;
        }
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::squared_l2;
    use pretty_assertions::assert_eq;

    #[test]
    fn stub_is_deterministic_within_process() {
        let model = EmbeddingModel::stub();
        let a = model.embed("budget_report_2023.xlsx").unwrap();
        let b = model.embed("budget_report_2023.xlsx").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIMENSION);
    }

    #[test]
    fn batch_preserves_input_order() {
        let model = EmbeddingModel::stub();
        let texts: Vec<String> = ["alpha.txt", "beta.txt", "gamma.txt"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let batch = model.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), texts.len());
        for (text, vector) in texts.iter().zip(&batch) {
            assert_eq!(vector, &model.embed(text).unwrap());
        }
    }

    #[test]
    fn empty_batch_returns_empty() {
        let model = EmbeddingModel::stub();
        assert!(model.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn stub_vectors_are_unit_length() {
        let model = EmbeddingModel::stub();
        for text in ["notes.txt", "???", ""] {
            let vec = model.embed(text).unwrap();
            let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4, "norm for {text:?} was {norm}");
        }
    }

    #[test]
    fn shared_tokens_score_closer_than_disjoint_tokens() {
        let model = EmbeddingModel::stub();
        let query = model.embed("project budget").unwrap();
        let related = model.embed("budget_report_2023.xlsx").unwrap();
        let unrelated = model.embed("notes.txt").unwrap();

        assert!(squared_l2(&query, &related) < squared_l2(&query, &unrelated));
    }
}
