//! Transient result type returned by every index search.

#[derive(Debug, Clone)]
pub struct RetrievalResult {
    pub question: String,
    pub answer: String,
    /// Derived as `1 / (1 + distance)`; in (0, 1], 1 for an exact vector match.
    pub similarity: f32,
    /// Squared Euclidean distance between query and entry embeddings.
    pub distance: f32,
}
