//! Flat in-memory index over corpus embeddings, squared-L2 metric.

use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::embedding::{EmbeddingBackend, EmbeddingError};

use super::corpus::{load_corpus, CorpusEntry, RawEntry};
use super::result::RetrievalResult;

const EMBED_BATCH_SIZE: usize = 32;
const EMBED_CONCURRENCY: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum IndexBuildError {
    #[error("failed to load corpus {path}: {reason}")]
    Corpus { path: String, reason: String },

    #[error("corpus file contains no entries")]
    EmptyCorpus,

    #[error("failed to embed corpus: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("corpus embeddings have inconsistent dimensions ({first} vs {other})")]
    DimensionMismatch { first: usize, other: usize },
}

/// Read-only after construction; shared across requests without locking.
pub struct CorpusIndex {
    entries: Vec<CorpusEntry>,
    backend: Arc<dyn EmbeddingBackend>,
    dimension: usize,
}

impl CorpusIndex {
    /// Builds the index from the corpus file. Any failure here is fatal:
    /// there is no partial index.
    pub async fn build(
        path: &Path,
        backend: Arc<dyn EmbeddingBackend>,
    ) -> Result<Self, IndexBuildError> {
        let raw = load_corpus(path)?;
        Self::build_from_entries(raw, backend).await
    }

    pub async fn build_from_entries(
        raw: Vec<RawEntry>,
        backend: Arc<dyn EmbeddingBackend>,
    ) -> Result<Self, IndexBuildError> {
        if raw.is_empty() {
            return Err(IndexBuildError::EmptyCorpus);
        }

        let texts: Vec<String> = raw.iter().map(|e| e.embedding_text()).collect();

        let batches: Vec<Vec<String>> = texts
            .chunks(EMBED_BATCH_SIZE)
            .map(|c| c.to_vec())
            .collect();

        let batch_results: Vec<Result<Vec<Vec<f32>>, EmbeddingError>> = stream::iter(
            batches
                .into_iter()
                .map(|batch| {
                    let backend = Arc::clone(&backend);
                    async move { backend.embed_batch(&batch).await }
                }),
        )
        .buffered(EMBED_CONCURRENCY)
        .collect()
        .await;

        let mut vectors = Vec::with_capacity(raw.len());
        for result in batch_results {
            vectors.extend(result?);
        }

        if vectors.len() != raw.len() {
            return Err(IndexBuildError::Embedding(EmbeddingError::CountMismatch {
                expected: raw.len(),
                got: vectors.len(),
            }));
        }

        let dimension = vectors[0].len();
        for v in &vectors {
            if v.len() != dimension {
                return Err(IndexBuildError::DimensionMismatch {
                    first: dimension,
                    other: v.len(),
                });
            }
        }

        let entries: Vec<CorpusEntry> = raw
            .into_iter()
            .zip(vectors)
            .map(|(e, embedding)| CorpusEntry {
                normalized_question: e.question.to_lowercase().trim().to_string(),
                question: e.question,
                answer: e.answer,
                embedding,
            })
            .collect();

        info!(vectors = entries.len(), dimension, "index créé");
        Ok(Self {
            entries,
            backend,
            dimension,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nearest neighbors for `query`, ascending by distance. A failing
    /// backend degrades to an empty list; callers treat that as "no match".
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, k: usize) -> Vec<RetrievalResult> {
        let query_vec = match self.backend.embed_batch(&[query.to_string()]).await {
            Ok(mut vectors) => match vectors.pop() {
                Some(v) => v,
                None => return Vec::new(),
            },
            Err(e) => {
                warn!(error = %e, "erreur recherche, résultats vides");
                return Vec::new();
            }
        };

        if query_vec.len() != self.dimension {
            warn!(
                got = query_vec.len(),
                expected = self.dimension,
                "dimension de requête inattendue, résultats vides"
            );
            return Vec::new();
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (squared_l2(&query_vec, &entry.embedding), i))
            .collect();

        // Ascending distance; ties keep corpus order via the stable sort.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        scored
            .into_iter()
            .take(k)
            .map(|(distance, i)| {
                let entry = &self.entries[i];
                RetrievalResult {
                    question: entry.question.clone(),
                    answer: entry.answer.clone(),
                    similarity: 1.0 / (1.0 + distance),
                    distance,
                }
            })
            .collect()
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
