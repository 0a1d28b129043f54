//! Heuristic detection of questions that depend on prior turns.

use crate::conversation::ConversationTurn;

/// Locale-specific table: demonstratives, interrogatives, discourse
/// connectives, pronouns and explicit backward references. Data, not logic.
const FOLLOWUP_KEYWORDS: &[&str] = &[
    "ça", "cela", "celui", "celle", "ceux", "celles",
    "pourquoi", "comment", "quand", "où", "combien",
    "explique", "détaille", "précise", "développe",
    "tu as dit", "tu disais", "tu parlais", "tu mentionnais",
    "avant", "précédemment", "plus tôt", "tantôt",
    "je comprends pas", "je ne comprends pas", "pas clair",
    "et", "mais", "donc", "alors", "aussi", "encore",
    "il", "elle", "ils", "elles", "le", "la", "les",
];

/// Pure function over (question, history); no internal state. False
/// positives are expected and handled like any other follow-up.
#[derive(Debug, Clone)]
pub struct FollowupDetector {
    keywords: Vec<String>,
}

impl Default for FollowupDetector {
    fn default() -> Self {
        Self {
            keywords: FOLLOWUP_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl FollowupDetector {
    /// Replaces the built-in French table, e.g. for another locale.
    pub fn with_keywords(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    pub fn is_followup(&self, question: &str, history: &[ConversationTurn]) -> bool {
        if history.is_empty() {
            return false;
        }

        // Very short questions lean on what was said before.
        if question.split_whitespace().count() <= 3 {
            return true;
        }

        let question_lower = question.to_lowercase();

        if self
            .keywords
            .iter()
            .any(|kw| question_lower.starts_with(kw.as_str()))
        {
            return true;
        }

        let keyword_count = self
            .keywords
            .iter()
            .filter(|kw| question_lower.contains(kw.as_str()))
            .count();

        keyword_count >= 2
    }
}
