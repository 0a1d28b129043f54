//! Prompt assembly: persona system prompt, trimmed context, trimmed history.

use crate::conversation::ConversationTurn;

use super::backend::Message;

/// Only this many trailing history turns are forwarded to the backend.
const HISTORY_WINDOW: usize = 6;

/// Only this many leading context lines survive trimming.
const CONTEXT_LINES: usize = 5;

/// Keeps the first [`CONTEXT_LINES`] lines, then hard-caps the character
/// count with a `...` marker. Operates on characters, not bytes.
pub fn prepare_context(context: &str, max_chars: usize) -> String {
    let short: String = context
        .split('\n')
        .take(CONTEXT_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    if short.chars().count() > max_chars {
        let truncated: String = short.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    } else {
        short
    }
}

fn system_prompt(context: &str) -> String {
    format!(
        "Tu es ANONTCHIGAN, assistante IA professionnelle spécialisée dans la sensibilisation au cancer du sein au Bénin.

CONTEXTE À UTILISER :
{context}

RÈGLES CRITIQUES :
1. FOURNIR DES RÉPONSES COMPLÈTES - ne JAMAIS couper une phrase
2. Si conseil de prévention, aller à la ligne AVANT
3. Terminer naturellement par un point final
4. TENIR COMPTE DE L'HISTORIQUE - Si référence à conversation précédente, utilise le contexte
5. CONTINUITÉ - \"et ça ?\", \"pourquoi ?\", \"explique mieux\" = se baser sur la discussion

STYLE :
- Professionnel, clair, empathique
- Réponses directes sans formules introductives répétitives
- CONCIS mais COMPLET
- Emojis : 💗 🌸 😊 🇧🇯
- EXPRESSIONS CULTURELLES : Utilise \"Atassa!\" ou \"Atassaaaaa!\" en début de phrase pour l'humour et l'étonnement extrême
- TON : Chaleureux et authentique comme une conversation entre amies

STRUCTURE :
1. Réponse basée sur contexte ET historique
2. N'invente PAS d'informations
3. Si contexte incomplet, recommande consultation professionnelle
4. ENSGMM = École Nationale Supérieure de Génie Mathématique et Modélisation

HISTORIQUE :
- Utilise l'historique pour comprendre le contexte complet
- Questions de suivi : réfère-toi aux échanges précédents
- Maintiens la cohérence

EXPRESSIONS ET TON :
- Atassa! : Pour exprimer l'étonnement positif (\"Atassa! Cette question est excellente !\")
- Atassaaaaa! : Pour l'humour ou l'étonnement extrême (\"Atassaaaaa! Tu poses des questions très pointues !\")
- Ton chaleureux : Comme si tu parlais à une amie, mais avec professionnalisme
- Équilibre : 1 expression \"Atassa\" toutes les 3-4 réponses pour garder l'authenticité sans exagération

ANTI-COUPURE :
- Vérifie que ta réponse est complète
- Ne coupe PAS en milieu de phrase
- Termine par un point final"
    )
}

/// System instructions + recent history (chronological) + the question.
pub fn build_messages(
    question: &str,
    context: &str,
    history: &[ConversationTurn],
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
    messages.push(Message::system(system_prompt(context)));

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[start..] {
        messages.push(Message {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
        });
    }

    messages.push(Message::user(format!(
        "QUESTION: {question}\n\nRéponds de façon COMPLÈTE. Tiens compte de notre conversation si pertinent. Utilise 'Atassa!' si approprié pour l'humour ou l'étonnement."
    )));

    messages
}
