//! Runtime configuration: code defaults overridable through the environment.

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatbotConfig {
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub conversation: ConversationConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RetrievalConfig {
    /// Minimum derived similarity for returning a corpus answer verbatim.
    pub similarity_threshold: f32,
    /// Number of neighbors requested from the index per search.
    pub retrieval_count: usize,
    /// Path to the (question, answer) corpus file.
    pub corpus_path: String,
    pub embedding_api_url: String,
    pub embedding_model: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GenerationConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_answer_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// Context string cap, in characters, after line trimming.
    pub max_context_chars: usize,
    /// Validity floor: shorter generations are rejected.
    pub min_answer_chars: usize,
    pub request_timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConversationConfig {
    /// Retained exchanges per user; the store keeps `2 * max_history_turns` turns.
    pub max_history_turns: usize,
    /// Capacity of the LRU map over user ids.
    pub conversation_capacity: usize,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            generation: GenerationConfig::default(),
            conversation: ConversationConfig::default(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            retrieval_count: 3,
            corpus_path: "data/cancer_sein.json".to_string(),
            embedding_api_url: "http://localhost:11434/v1/embeddings".to_string(),
            embedding_model: "paraphrase-multilingual-minilm".to_string(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "llama-3.1-8b-instant".to_string(),
            max_answer_tokens: 600,
            temperature: 0.7,
            top_p: 0.9,
            max_context_chars: 1000,
            min_answer_chars: 30,
            request_timeout_secs: 30,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_history_turns: 8,
            conversation_capacity: 1024,
        }
    }
}

impl ChatbotConfig {
    /// Loads defaults, then applies environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("GROQ_API_KEY") {
            config.generation.api_key = v;
        }
        if let Ok(v) = env::var("GROQ_API_URL") {
            config.generation.api_url = v;
        }
        if let Ok(v) = env::var("GROQ_MODEL") {
            config.generation.model = v;
        }
        if let Ok(v) = env::var("EMBEDDING_API_URL") {
            config.retrieval.embedding_api_url = v;
        }
        if let Ok(v) = env::var("EMBEDDING_MODEL") {
            config.retrieval.embedding_model = v;
        }
        if let Ok(v) = env::var("CORPUS_PATH") {
            config.retrieval.corpus_path = v;
        }
        if let Ok(v) = env::var("SIMILARITY_THRESHOLD") {
            if let Ok(parsed) = v.parse() {
                config.retrieval.similarity_threshold = parsed;
            }
        }
        if let Ok(v) = env::var("MAX_HISTORY_TURNS") {
            if let Ok(parsed) = v.parse() {
                config.conversation.max_history_turns = parsed;
            }
        }

        config
    }
}
