//! Generation layer: prompt assembly, backend call, output post-processing.
//!
//! The orchestrator only sees [`GenerationClient::generate`]; everything the
//! backend returns goes through cleaning, validation and completeness repair
//! before it reaches a user.

pub mod backend;
pub mod client;
pub mod postprocess;
pub mod prompt;


pub use backend::{ChatBackend, HttpChatBackend, Message, SamplingParams};
pub use client::GenerationClient;
pub use postprocess::InvalidAnswer;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation backend is unavailable (startup probe failed)")]
    Unavailable,

    #[error("generation request timed out")]
    Timeout,

    #[error("unable to reach the generation backend: {0}")]
    Connection(String),

    #[error("generation backend returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("generation backend returned no usable content")]
    EmptyResponse,

    #[error("failed to decode generation response: {0}")]
    Decode(String),

    #[error("generated answer rejected: {0}")]
    Invalid(#[from] InvalidAnswer),
}
