//! High-level generation client: availability probe, prompt, post-processing.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::GenerationConfig;
use crate::conversation::ConversationTurn;

use super::backend::{ChatBackend, Message, SamplingParams};
use super::postprocess::{clean_response, ensure_complete, validate_answer};
use super::prompt::{build_messages, prepare_context};
use super::GenerationError;

/// Tokens requested by the startup connectivity probe.
const PROBE_MAX_TOKENS: u32 = 5;

pub struct GenerationClient {
    backend: Arc<dyn ChatBackend>,
    config: GenerationConfig,
    available: bool,
}

impl GenerationClient {
    /// Probes the backend once with a cheap real call. The flag is set here
    /// and never flipped afterwards; a call failing at runtime stays a
    /// per-request error.
    pub async fn connect(backend: Arc<dyn ChatBackend>, config: GenerationConfig) -> Self {
        let probe = SamplingParams {
            max_tokens: PROBE_MAX_TOKENS,
            temperature: config.temperature,
            top_p: config.top_p,
        };

        let available = match backend.complete(&[Message::user("test")], &probe).await {
            Ok(_) => {
                info!("service de génération initialisé");
                true
            }
            Err(e) => {
                warn!(error = %e, "service de génération non disponible");
                false
            }
        };

        Self {
            backend,
            config,
            available,
        }
    }

    /// Constructor for tests and for callers that already know the backend
    /// state and want to skip the probe.
    pub fn with_availability(
        backend: Arc<dyn ChatBackend>,
        config: GenerationConfig,
        available: bool,
    ) -> Self {
        Self {
            backend,
            config,
            available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Generates a complete answer conditioned on `context` and the recent
    /// `history`. The raw output is cleaned, validated and repaired before
    /// being returned; a rejected output is an error, not a short answer.
    #[instrument(skip(self, context, history), fields(history_len = history.len()))]
    pub async fn generate(
        &self,
        question: &str,
        context: &str,
        history: &[ConversationTurn],
    ) -> Result<String, GenerationError> {
        if !self.available {
            return Err(GenerationError::Unavailable);
        }

        let context_short = prepare_context(context, self.config.max_context_chars);
        let messages = build_messages(question, &context_short, history);

        let params = SamplingParams {
            max_tokens: self.config.max_answer_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let raw = self.backend.complete(&messages, &params).await?;

        let answer = clean_response(raw.trim());
        validate_answer(&answer, self.config.min_answer_chars)?;
        let answer = ensure_complete(&answer);

        info!(chars = answer.chars().count(), "réponse générée");
        Ok(answer)
    }
}
