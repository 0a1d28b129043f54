//! Output contract of the orchestrator.

use serde::{Deserialize, Serialize};

/// How the answer was produced; the sole signal of degraded service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Salutation,
    SalutationContinue,
    Direct,
    FollowupGenerated,
    Generated,
    NoResult,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    pub method: Method,
    /// Retrieval confidence of the top result, when retrieval drove the branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Corpus question matched by the direct branch, for observability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_question: Option<String>,
}

impl ChatResponse {
    pub fn new(answer: impl Into<String>, method: Method) -> Self {
        Self {
            answer: answer.into(),
            method,
            score: None,
            matched_question: None,
        }
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_matched_question(mut self, question: impl Into<String>) -> Self {
        self.matched_question = Some(question.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub generation_available: bool,
    pub corpus_size: usize,
}
