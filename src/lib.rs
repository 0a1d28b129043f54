//! # ANONTCHIGAN
//!
//! Noyau conversationnel de sensibilisation au cancer du sein : corpus
//! de questions-réponses indexé par similarité vectorielle, génération
//! conditionnée par le contexte récupéré et l'historique de conversation.
//!
//! ```text
//! question + user_id → ChatbotService → salutation | direct | génération
//! ```
//!
//! The decision pipeline lives in [`engine::ChatbotService`]; everything
//! else is a collaborator: [`retrieval`] owns the corpus index,
//! [`generation`] the backend calls and output repair, [`conversation`]
//! the per-user bounded memory.

pub mod config;
pub mod conversation;
pub mod embedding;
pub mod engine;
pub mod generation;
pub mod retrieval;

pub use config::ChatbotConfig;
pub use engine::{ChatResponse, ChatbotService, HealthStatus, Method};
