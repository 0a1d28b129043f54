//! Loading of the curated (question, answer) corpus file.

use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::index::IndexBuildError;

/// On-disk schema: an array of `{question, answer}` objects.
#[derive(Deserialize, Debug, Clone)]
pub struct RawEntry {
    pub question: String,
    pub answer: String,
}

/// Immutable corpus record, created once at index-build time.
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    pub question: String,
    pub normalized_question: String,
    pub answer: String,
    pub embedding: Vec<f32>,
}

impl RawEntry {
    /// Text actually embedded for this entry. Retrieval matches on the
    /// combined question + answer content, not question similarity alone.
    pub fn embedding_text(&self) -> String {
        format!("Q: {} R: {}", self.question, self.answer)
    }
}

pub fn load_corpus(path: &Path) -> Result<Vec<RawEntry>, IndexBuildError> {
    let raw = std::fs::read_to_string(path).map_err(|e| IndexBuildError::Corpus {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let entries: Vec<RawEntry> =
        serde_json::from_str(&raw).map_err(|e| IndexBuildError::Corpus {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    if entries.is_empty() {
        return Err(IndexBuildError::EmptyCorpus);
    }

    info!(count = entries.len(), "questions chargées");
    Ok(entries)
}
