use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::ChatbotConfig;
use crate::conversation::{ConversationTurn, Role};
use crate::embedding::{EmbeddingBackend, EmbeddingError};
use crate::generation::{ChatBackend, GenerationClient, GenerationError, Message, SamplingParams};
use crate::retrieval::{CorpusIndex, RawEntry};

use super::followup::FollowupDetector;
use super::orchestrator::ChatbotService;
use super::types::Method;

const KNOWN_QUESTION: &str = "Qu'est-ce que le cancer du sein?";
const KNOWN_ANSWER: &str =
    "Une maladie où des cellules du sein se multiplient de façon anormale et forment une tumeur.";

struct FakeEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    failing: AtomicBool,
}

#[async_trait::async_trait]
impl EmbeddingBackend for FakeEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Connection("backend down".to_string()));
        }
        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| vec![50.0, 50.0])
            })
            .collect())
    }
}

struct ScriptedChat {
    reply: Result<String, ()>,
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedChat {
    async fn complete(
        &self,
        _messages: &[Message],
        _params: &SamplingParams,
    ) -> Result<String, GenerationError> {
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(()) => Err(GenerationError::Timeout),
        }
    }
}

enum Gen {
    Unavailable,
    Replies(&'static str),
    Fails,
}

async fn service(gen: Gen) -> (ChatbotService, Arc<FakeEmbedder>) {
    let entries = vec![RawEntry {
        question: KNOWN_QUESTION.to_string(),
        answer: KNOWN_ANSWER.to_string(),
    }];

    let mut vectors = HashMap::new();
    vectors.insert(entries[0].embedding_text(), vec![1.0, 0.0]);
    // The exact question embeds right next to its corpus entry.
    vectors.insert(KNOWN_QUESTION.to_string(), vec![1.0, 0.1]);

    let embedder = Arc::new(FakeEmbedder {
        vectors,
        failing: AtomicBool::new(false),
    });

    let backend: Arc<dyn EmbeddingBackend> = embedder.clone();
    let index = CorpusIndex::build_from_entries(entries, backend)
        .await
        .unwrap();

    let config = ChatbotConfig::default();
    let (backend, available): (Arc<dyn ChatBackend>, bool) = match gen {
        Gen::Unavailable => (Arc::new(ScriptedChat { reply: Err(()) }), false),
        Gen::Replies(text) => (
            Arc::new(ScriptedChat {
                reply: Ok(text.to_string()),
            }),
            true,
        ),
        Gen::Fails => (Arc::new(ScriptedChat { reply: Err(()) }), true),
    };
    let generation =
        GenerationClient::with_availability(backend, config.generation.clone(), available);

    (
        ChatbotService::new(Arc::new(index), generation, config),
        embedder,
    )
}

fn turns(role_content: &[(Role, &str)]) -> Vec<ConversationTurn> {
    role_content
        .iter()
        .map(|(r, c)| ConversationTurn::new(*r, *c))
        .collect()
}

/* ---------- follow-up heuristic ---------- */

#[test]
fn test_followup_false_on_empty_history() {
    let detector = FollowupDetector::default();
    assert!(!detector.is_followup("pourquoi ?", &[]));
}

#[test]
fn test_followup_short_question() {
    let detector = FollowupDetector::default();
    let history = turns(&[(Role::User, "q"), (Role::Assistant, "r")]);
    assert!(detector.is_followup("et après ?", &history));
}

#[test]
fn test_followup_prefix_keyword() {
    let detector = FollowupDetector::default();
    let history = turns(&[(Role::User, "q"), (Role::Assistant, "r")]);
    assert!(detector.is_followup("explique davantage ce traitement particulier", &history));
}

#[test]
fn test_followup_two_keywords_anywhere() {
    let detector = FollowupDetector::default();
    let history = turns(&[(Role::User, "q"), (Role::Assistant, "r")]);
    // "elle" and "avant" both appear, neither as prefix.
    assert!(detector.is_followup("ma tante dit qu'elle se faisait dépister avant", &history));
}

#[test]
fn test_followup_standalone_question_is_not_followup() {
    let detector = FollowupDetector::default();
    let history = turns(&[(Role::User, "q"), (Role::Assistant, "r")]);
    assert!(!detector.is_followup("quels sont symptômes du cancer du sein ?", &history));
}

/* ---------- salutation branches ---------- */

#[tokio::test]
async fn test_salutation_with_empty_history() {
    let (service, _) = service(Gen::Unavailable).await;

    let response = service.process_question("Bonjour", "u1").await;
    assert_eq!(response.method, Method::Salutation);
    assert!(response.answer.contains("ANONTCHIGAN"));
    assert_eq!(service.store().get_history("u1").len(), 2);
}

#[tokio::test]
async fn test_salutation_with_existing_history() {
    let (service, _) = service(Gen::Unavailable).await;

    service.process_question("bonjour", "u1").await;
    let response = service.process_question("salut", "u1").await;

    assert_eq!(response.method, Method::SalutationContinue);
    assert!(response.answer.contains("toujours là"));
    assert_eq!(service.store().get_history("u1").len(), 4);
}

/* ---------- retrieval branches ---------- */

#[tokio::test]
async fn test_direct_answer_above_threshold() {
    let (service, _) = service(Gen::Unavailable).await;

    let response = service.process_question(KNOWN_QUESTION, "u1").await;

    assert_eq!(response.method, Method::Direct);
    assert_eq!(response.answer, KNOWN_ANSWER);
    assert!(response.score.unwrap() >= 0.75);
    assert_eq!(response.matched_question.as_deref(), Some(KNOWN_QUESTION));
}

#[tokio::test]
async fn test_generated_branch_below_threshold_with_unavailable_backend() {
    let (service, _) = service(Gen::Unavailable).await;

    // Unknown question embeds far away: results exist but similarity is low.
    let response = service
        .process_question("parle-moi des centres de dépistage régionaux", "u1")
        .await;

    assert_eq!(response.method, Method::Generated);
    assert!(response.score.unwrap() < 0.75);
    assert!(response.answer.contains("professionnel de santé"));
    // Fallback answers still count as a full exchange.
    assert_eq!(service.store().get_history("u1").len(), 2);
}

#[tokio::test]
async fn test_generated_branch_with_working_backend() {
    let reply = "Le dépistage est disponible dans plusieurs centres de santé au Bénin, renseignez-vous auprès d'un médecin.";
    let (service, _) = service(Gen::Replies(reply)).await;

    let response = service
        .process_question("parle-moi des centres de dépistage régionaux", "u1")
        .await;

    assert_eq!(response.method, Method::Generated);
    assert_eq!(response.answer, reply);
}

#[tokio::test]
async fn test_generation_failure_substitutes_fixed_sentence() {
    let (service, _) = service(Gen::Fails).await;

    let response = service
        .process_question("parle-moi des centres de dépistage régionaux", "u1")
        .await;

    assert_eq!(response.method, Method::Generated);
    assert!(response.answer.contains("médecin spécialisé"));
    assert_eq!(service.store().get_history("u1").len(), 2);
}

#[tokio::test]
async fn test_no_result_when_search_degrades() {
    let (service, embedder) = service(Gen::Unavailable).await;

    embedder.failing.store(true, Ordering::SeqCst);
    let response = service
        .process_question("quels sont symptômes du cancer du sein ?", "u1")
        .await;

    assert_eq!(response.method, Method::NoResult);
    assert!(response.answer.contains("professionnel de santé"));
    assert_eq!(service.store().get_history("u1").len(), 2);
}

/* ---------- follow-up branch ---------- */

#[tokio::test]
async fn test_followup_generated_with_unavailable_backend() {
    let (service, _) = service(Gen::Unavailable).await;

    service.process_question("bonjour", "u1").await;
    let response = service.process_question("pourquoi ?", "u1").await;

    assert_eq!(response.method, Method::FollowupGenerated);
    assert!(response.score.is_none());
    assert!(response.answer.contains("discussion précédente"));
    assert_eq!(service.store().get_history("u1").len(), 4);
}

#[tokio::test]
async fn test_followup_generated_with_working_backend() {
    let reply =
        "Atassa! La question est pertinente: le dépistage précoce augmente fortement les chances de guérison.";
    let (service, _) = service(Gen::Replies(reply)).await;

    service.process_question("bonjour", "u1").await;
    let response = service.process_question("pourquoi ?", "u1").await;

    assert_eq!(response.method, Method::FollowupGenerated);
    assert_eq!(response.answer, reply);
}

/* ---------- error path ---------- */

#[tokio::test]
async fn test_blank_question_maps_to_error_without_history() {
    let (service, _) = service(Gen::Unavailable).await;

    let response = service.process_question("   ", "u1").await;

    assert_eq!(response.method, Method::Error);
    assert!(response.answer.contains("Désolé"));
    // The error path deliberately records nothing.
    assert!(service.store().get_history("u1").is_empty());
}

/* ---------- health ---------- */

#[tokio::test]
async fn test_health_status() {
    let (service, _) = service(Gen::Unavailable).await;

    let health = service.get_health_status();
    assert!(!health.generation_available);
    assert_eq!(health.corpus_size, 1);
}
