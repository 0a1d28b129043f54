//! Shared mutable conversation state, one bounded log per user id.

use lru::LruCache;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::turn::{ConversationTurn, Role};

/// Public handle to the store. A single coarse lock serializes every
/// read-modify-append; the lock is never held across an await point.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<Mutex<StoreInner>>,
}

struct StoreInner {
    // LRU over user ids bounds whole-process memory; within a user the
    // turn log itself is FIFO-trimmed.
    conversations: LruCache<String, VecDeque<ConversationTurn>>,
    max_turns: usize,
}

impl ConversationStore {
    /// `max_history_turns` exchanges are retained per user, i.e.
    /// `2 * max_history_turns` turns. `capacity` bounds distinct user ids.
    pub fn new(max_history_turns: usize, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                conversations: LruCache::new(capacity),
                max_turns: max_history_turns * 2,
            })),
        }
    }

    /// Empty for unknown users; never creates an entry.
    pub fn get_history(&self, user_id: &str) -> Vec<ConversationTurn> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner
            .conversations
            .get(user_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Appends one turn, then trims the oldest turns past the bound.
    pub fn add_message(&self, user_id: &str, role: Role, content: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.append(user_id, ConversationTurn::new(role, content));
    }

    /// Appends the user question and the assistant answer as a single
    /// locked operation, so overlapping requests cannot interleave a pair.
    pub fn add_exchange(&self, user_id: &str, question: &str, answer: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.append(user_id, ConversationTurn::new(Role::User, question));
        inner.append(user_id, ConversationTurn::new(Role::Assistant, answer));
        debug!(user_id, "échange enregistré");
    }

    /// Number of distinct users currently tracked.
    pub fn user_count(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.conversations.len()
    }
}

impl StoreInner {
    fn append(&mut self, user_id: &str, turn: ConversationTurn) {
        let max_turns = self.max_turns;
        if let Some(turns) = self.conversations.get_mut(user_id) {
            turns.push_back(turn);
            while turns.len() > max_turns {
                turns.pop_front();
            }
        } else {
            let mut turns = VecDeque::with_capacity(max_turns.min(16));
            turns.push_back(turn);
            self.conversations.put(user_id.to_string(), turns);
        }
    }
}
