//! Per-user conversation memory: bounded turn logs behind a bounded LRU map.

pub mod store;
pub mod turn;


pub use store::ConversationStore;
pub use turn::{ConversationTurn, Role};
