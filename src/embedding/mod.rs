//! Embedding backend: turns text into fixed-length vectors over HTTP.
//!
//! The index never talks to the network directly; it goes through the
//! [`EmbeddingBackend`] trait so tests can substitute a deterministic fake.

use crate::config::RetrievalConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request timed out")]
    Timeout,

    #[error("unable to reach the embedding backend: {0}")]
    Connection(String),

    #[error("embedding backend returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode embedding response: {0}")]
    Decode(String),

    #[error("embedding backend returned {got} vectors for {expected} inputs")]
    CountMismatch { expected: usize, got: usize },

    #[error("embedding backend returned an empty vector")]
    EmptyVector,
}

#[async_trait::async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embeds every input text, preserving order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// OpenAI-style `/embeddings` client.
pub struct HttpEmbeddingClient {
    client: Client,
    api_url: String,
    model: String,
}

impl HttpEmbeddingClient {
    pub fn new(config: &RetrievalConfig, timeout_secs: u64) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.embedding_api_url.clone(),
            model: config.embedding_model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingBackend for HttpEmbeddingClient {
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else {
                    EmbeddingError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let decoded: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Decode(e.to_string()))?;

        if decoded.data.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                got: decoded.data.len(),
            });
        }

        let vectors: Vec<Vec<f32>> = decoded.data.into_iter().map(|d| d.embedding).collect();
        if vectors.iter().any(|v| v.is_empty()) {
            return Err(EmbeddingError::EmptyVector);
        }

        debug!(dimension = vectors[0].len(), "batch embedded");
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_yields_empty_batch_without_a_request() {
        let client = HttpEmbeddingClient::new(&RetrievalConfig::default(), 1).unwrap();
        let vectors = client.embed_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }
}
