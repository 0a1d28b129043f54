//! Cleaning, validation and completeness repair of raw backend output.

use tracing::warn;

/// Openers stripped when the backend ignores the "no introductory filler"
/// instruction.
const UNWANTED_INTROS: &[&str] = &[
    "bonjour",
    "salut",
    "coucou",
    "hello",
    "akwè",
    "yo",
    "bonsoir",
    "hi",
    "excellente question",
    "je suis ravi",
    "permettez-moi",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidAnswer {
    #[error("answer too short ({chars} chars, minimum {min})")]
    TooShort { chars: usize, min: usize },

    #[error("answer opens with an admission of ignorance")]
    AdmitsIgnorance,
}

/// Drops a leading greeting/flattery clause up to and including the first
/// sentence boundary, then re-capitalizes the remaining text.
pub fn clean_response(answer: &str) -> String {
    let answer = answer.trim();
    let answer_lower = answer.to_lowercase();

    for intro in UNWANTED_INTROS {
        if answer_lower.starts_with(intro) {
            if let Some(pos) = answer.find('.') {
                let rest = answer[pos + 1..].trim();
                if !rest.is_empty() {
                    return capitalize_first(rest);
                }
            }
            break;
        }
    }

    answer.to_string()
}

/// Explicit accept/reject decision; rejection is not an exceptional path.
pub fn validate_answer(answer: &str, min_chars: usize) -> Result<(), InvalidAnswer> {
    let chars = answer.chars().count();
    if chars < min_chars {
        return Err(InvalidAnswer::TooShort {
            chars,
            min: min_chars,
        });
    }

    let lower = answer.to_lowercase();
    if lower.starts_with("je ne sais pas") || lower.starts_with("désolé") {
        return Err(InvalidAnswer::AdmitsIgnorance);
    }

    Ok(())
}

/// Best-effort repair of truncated generations: cut back to the last full
/// sentence when one ends close to the tail, otherwise force a final period.
pub fn ensure_complete(answer: &str) -> String {
    if answer.is_empty() {
        return answer.to_string();
    }

    let chars: Vec<char> = answer.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(10)..].iter().collect();

    let looks_cut = answer.ends_with("...")
        || answer.ends_with(',')
        || answer.ends_with(';')
        || tail.contains("...");

    if !looks_cut {
        return answer.to_string();
    }

    warn!("détection possible de réponse coupée");

    let sentence_end = chars
        .iter()
        .rposition(|&c| c == '.' || c == '!' || c == '?');

    match sentence_end {
        // Terminator within the last 5 characters: truncate there.
        Some(end) if end > 0 && end >= chars.len().saturating_sub(5) => {
            chars[..=end].iter().collect()
        }
        _ => {
            let stripped: &str = answer.trim_end_matches([' ', ',', ';', '.']);
            if stripped.ends_with('!') || stripped.ends_with('?') {
                stripped.to_string()
            } else {
                format!("{stripped}.")
            }
        }
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
