/// Default number of characters shown in a result preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 250;

/// Take the first `max_chars` characters of `text`, appending `...` when
/// anything was cut. Counts characters, not bytes, so multi-byte text is
/// never split mid-codepoint.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Lowercased runs of alphabetic characters.
///
/// # Examples
///
/// ```
/// use beacon::text_util::alphabetic_words;
///
/// let words: Vec<_> = alphabetic_words("M6.2 quake, 3 aftershocks").collect();
/// assert_eq!(words, vec!["m", "quake", "aftershocks"]);
/// ```
pub fn alphabetic_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Lowercased alphanumeric tokens of two or more characters, the unit the
/// n-gram extractor counts.
pub fn word_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().nth(1).is_some())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_text_is_unchanged() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("exactly", 7), "exactly");
    }

    #[test]
    fn preview_truncates_long_text() {
        let text = "a".repeat(300);
        let p = preview(&text, DEFAULT_PREVIEW_CHARS);
        assert_eq!(p.chars().count(), DEFAULT_PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("ééééé", 2), "éé...");
    }

    #[test]
    fn alphabetic_words_split_on_digits_and_punctuation() {
        let words: Vec<_> = alphabetic_words("Flood-Warning 2024: EVACUATE!").collect();
        assert_eq!(words, vec!["flood", "warning", "evacuate"]);
    }

    #[test]
    fn word_tokens_drop_single_characters() {
        let tokens: Vec<_> = word_tokens("A 7.1 quake hit Zone B2").collect();
        assert_eq!(tokens, vec!["quake", "hit", "zone", "b2"]);
    }
}
