//! Public façade for the answer-selection engine.

pub mod followup;
pub mod orchestrator;
pub mod types;

#[cfg(test)]
mod tests;

pub use followup::FollowupDetector;
pub use orchestrator::ChatbotService;
pub use types::{ChatResponse, HealthStatus, Method};
