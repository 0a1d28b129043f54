//! High-level coordinator: salutation short-circuit → retrieval →
//! similarity decision → generation fallback chain → history update.

use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::config::ChatbotConfig;
use crate::conversation::{ConversationStore, ConversationTurn, Role};
use crate::generation::GenerationClient;
use crate::retrieval::{CorpusIndex, RetrievalResult};

use super::followup::FollowupDetector;
use super::types::{ChatResponse, HealthStatus, Method};

const SALUTATIONS: &[&str] = &[
    "cc", "bonjour", "salut", "coucou", "hello", "akwe", "yo", "bonsoir", "hi",
];

const GREETING_RESPONSES: &[&str] = &[
    "Je suis ANONTCHIGAN, assistante pour la sensibilisation au cancer du sein. Comment puis-je vous aider ? 💗",
    "Bonjour ! Je suis ANONTCHIGAN. Que souhaitez-vous savoir sur le cancer du sein ? 🌸",
    "ANONTCHIGAN à votre service. Posez-moi vos questions sur la prévention du cancer du sein. 😊",
];

const GREETING_CONTINUE: &str =
    "Je suis toujours là ! 😊 Continuons notre discussion sur la santé mammaire. Que voulez-vous savoir ?";

const NO_RESULT_ANSWER: &str =
    "Les informations disponibles ne couvrent pas ce point. Je vous recommande de consulter un professionnel de santé au Bénin. 💗";

const FOLLOWUP_UNAVAILABLE: &str =
    "Je me base sur notre discussion précédente, mais pour plus de détails, consultez un professionnel. 💗";

const FOLLOWUP_FAILED: &str =
    "Pour continuer cette discussion, consultez un médecin spécialisé. 🌸";

const GENERATED_UNAVAILABLE: &str =
    "Pour cette question, consultez un professionnel de santé. La prévention précoce est essentielle. 💗";

const GENERATED_FAILED: &str =
    "Pour des informations précises, consultez un médecin spécialisé au Bénin. 🌸";

const GENERIC_APOLOGY: &str = "Désolé, une erreur s'est produite. Veuillez réessayer.";

/// Snippet cap when formatting history/retrieval blocks into prompt context.
const SNIPPET_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("question is empty")]
    EmptyQuestion,
}

/// Explicitly constructed service object; owned by startup, handed by
/// reference to request handlers. The index is read-only, the store is
/// internally synchronized, so `&self` is enough for concurrent requests.
pub struct ChatbotService {
    index: Arc<CorpusIndex>,
    generation: GenerationClient,
    store: ConversationStore,
    followup: FollowupDetector,
    config: ChatbotConfig,
}

impl ChatbotService {
    pub fn new(
        index: Arc<CorpusIndex>,
        generation: GenerationClient,
        config: ChatbotConfig,
    ) -> Self {
        let store = ConversationStore::new(
            config.conversation.max_history_turns,
            config.conversation.conversation_capacity,
        );
        info!("ChatbotService initialisé");
        Self {
            index,
            generation,
            store,
            followup: FollowupDetector::default(),
            config,
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn get_health_status(&self) -> HealthStatus {
        HealthStatus {
            generation_available: self.generation.is_available(),
            corpus_size: self.index.len(),
        }
    }

    /// Entire public contract surfaced to callers. Any internal error is
    /// converted into a generic apology; that path records no history.
    #[instrument(skip(self))]
    pub async fn process_question(&self, question: &str, user_id: &str) -> ChatResponse {
        match self.answer(question, user_id).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "échec du pipeline");
                ChatResponse::new(GENERIC_APOLOGY, Method::Error)
            }
        }
    }

    async fn answer(
        &self,
        question: &str,
        user_id: &str,
    ) -> Result<ChatResponse, OrchestratorError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(OrchestratorError::EmptyQuestion);
        }

        let history = self.store.get_history(user_id);
        info!(user_id, messages = history.len(), "historique utilisateur");

        let question_lower = question.to_lowercase();

        if SALUTATIONS.contains(&question_lower.as_str()) {
            let response = if history.is_empty() {
                let answer = GREETING_RESPONSES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(GREETING_RESPONSES[0]);
                ChatResponse::new(answer, Method::Salutation)
            } else {
                ChatResponse::new(GREETING_CONTINUE, Method::SalutationContinue)
            };
            self.store.add_exchange(user_id, question, &response.answer);
            return Ok(response);
        }

        let faiss_results = self
            .index
            .search(question, self.config.retrieval.retrieval_count)
            .await;

        if self.followup.is_followup(question, &history) && !history.is_empty() {
            info!("question de suivi détectée, priorité à l'historique");
            return Ok(self
                .answer_followup(question, user_id, &history, &faiss_results)
                .await);
        }

        if faiss_results.is_empty() {
            self.store.add_exchange(user_id, question, NO_RESULT_ANSWER);
            return Ok(ChatResponse::new(NO_RESULT_ANSWER, Method::NoResult));
        }

        // Results come back ascending by distance; the first one decides.
        let best = &faiss_results[0];
        let similarity = best.similarity;

        if similarity >= self.config.retrieval.similarity_threshold {
            self.store.add_exchange(user_id, question, &best.answer);
            return Ok(ChatResponse::new(best.answer.clone(), Method::Direct)
                .with_score(similarity)
                .with_matched_question(best.question.clone()));
        }

        let context = format_retrieval_blocks(&faiss_results, 3).join("\n\n");
        let answer = self
            .try_generate(
                question,
                &context,
                &history,
                GENERATED_UNAVAILABLE,
                GENERATED_FAILED,
            )
            .await;

        self.store.add_exchange(user_id, question, &answer);
        Ok(ChatResponse::new(answer, Method::Generated).with_score(similarity))
    }

    /// Follow-up context leads with the assistant's recent messages, then
    /// the top retrieval results; generation sees the full stored history.
    async fn answer_followup(
        &self,
        question: &str,
        user_id: &str,
        history: &[ConversationTurn],
        faiss_results: &[RetrievalResult],
    ) -> ChatResponse {
        let mut context_parts = Vec::new();

        let start = history.len().saturating_sub(4);
        for (i, turn) in history[start..].iter().enumerate() {
            if turn.role == Role::Assistant {
                context_parts.push(format!(
                    "Message précédent {}: {}",
                    i + 1,
                    truncate_chars(&turn.content, SNIPPET_CHARS)
                ));
            }
        }

        context_parts.extend(format_retrieval_blocks(faiss_results, 2));
        let context = context_parts.join("\n\n");

        let answer = self
            .try_generate(
                question,
                &context,
                history,
                FOLLOWUP_UNAVAILABLE,
                FOLLOWUP_FAILED,
            )
            .await;

        self.store.add_exchange(user_id, question, &answer);
        ChatResponse::new(answer, Method::FollowupGenerated)
    }

    /// Generation fallback chain: unavailable backend and failed call each
    /// substitute their fixed redirect sentence; neither propagates.
    async fn try_generate(
        &self,
        question: &str,
        context: &str,
        history: &[ConversationTurn],
        unavailable_fallback: &str,
        failure_fallback: &str,
    ) -> String {
        if !self.generation.is_available() {
            return unavailable_fallback.to_string();
        }

        match self.generation.generate(question, context, history).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "génération échouée");
                failure_fallback.to_string()
            }
        }
    }
}

fn format_retrieval_blocks(results: &[RetrievalResult], limit: usize) -> Vec<String> {
    results
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, result)| {
            let answer = if result.answer.chars().count() > SNIPPET_CHARS {
                format!(
                    "{}...",
                    truncate_chars(&result.answer, SNIPPET_CHARS.saturating_sub(3))
                )
            } else {
                result.answer.clone()
            };
            format!("{}. Q: {}\n   R: {}", i + 1, result.question, answer)
        })
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
