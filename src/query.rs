use std::collections::BTreeSet;

use crate::vocabulary::Vocabulary;

pub const DEFAULT_AUTOCORRECT_CUTOFF: f64 = 0.8;

/// A query after normalization, spelling correction and classification.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Interpretation {
    pub corrected: String,
    pub is_emergency: bool,
}

/// Lowercase, trim and autocorrect `query`, then classify it.
pub fn interpret(
    query: &str,
    vocab: &Vocabulary,
    emergency_phrases: &BTreeSet<String>,
    cutoff: f64,
) -> Interpretation {
    let corrected = query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(|token| autocorrect(token, vocab, cutoff))
        .collect::<Vec<_>>()
        .join(" ");

    classify(corrected, emergency_phrases)
}

/// Interpret without spelling correction: only lowercasing, trimming and
/// whitespace collapsing are applied.
pub fn interpret_verbatim(
    query: &str,
    emergency_phrases: &BTreeSet<String>,
) -> Interpretation {
    let corrected = query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    classify(corrected, emergency_phrases)
}

fn classify(
    corrected: String,
    emergency_phrases: &BTreeSet<String>,
) -> Interpretation {
    let is_emergency = !corrected.is_empty()
        && emergency_phrases
            .iter()
            .any(|phrase| corrected.contains(phrase.as_str()));

    Interpretation {
        corrected,
        is_emergency,
    }
}

/// Replace `token` with its closest vocabulary word if that word's
/// similarity is at least `cutoff`.
///
/// Tokens already in the vocabulary are returned unchanged. Among equally
/// similar candidates the lexicographically smallest wins.
pub fn autocorrect(token: &str, vocab: &Vocabulary, cutoff: f64) -> String {
    if vocab.contains(token) {
        return token.to_string();
    }

    let mut best: Option<(&str, f64)> = None;
    for candidate in vocab.iter() {
        let similarity = strsim::normalized_levenshtein(token, candidate);
        if similarity < cutoff {
            continue;
        }
        if best.is_none_or(|(_, score)| similarity > score) {
            best = Some((candidate, similarity));
        }
    }

    match best {
        Some((word, similarity)) => {
            tracing::debug!(token, word, similarity, "autocorrected token");
            word.to_string()
        }
        None => token.to_string(),
    }
}
