use std::collections::BTreeSet;

use crate::{
    document::Document,
    ngram::{ENGLISH_STOP_WORDS, NgramRange, frequent_ngrams},
    text_util::alphabetic_words,
};

/// Topic words that mark a document as emergency-related. Only such
/// documents contribute emergency phrases.
pub const EMERGENCY_TOPICS: &[&str] = &[
    "earthquake",
    "cyclone",
    "tsunami",
    "flood",
    "hurricane",
    "wildfire",
    "landslide",
    "storm",
];

pub const DEFAULT_MIN_PHRASE_FREQ: usize = 2;

/// Known lowercase words across the corpus, used for spelling correction.
///
/// Backed by an ordered set so iteration (and therefore tie-breaking during
/// correction) is the same on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    words: BTreeSet<String>,
}

impl Vocabulary {
    pub fn from_documents(docs: &[Document]) -> Self {
        let mut words = BTreeSet::new();
        for doc in docs {
            words.extend(alphabetic_words(&doc.title));
            words.extend(alphabetic_words(&doc.text));
        }
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Words in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Whether the combined title and text mention any emergency topic.
pub fn is_emergency_document(doc: &Document) -> bool {
    let haystack = doc.haystack();
    EMERGENCY_TOPICS.iter().any(|topic| haystack.contains(topic))
}

/// Extract phrases of one to three words that appear in at least
/// `min_freq` emergency documents.
pub fn extract_emergency_phrases(
    docs: &[Document],
    min_freq: usize,
) -> BTreeSet<String> {
    let texts: Vec<String> = docs
        .iter()
        .filter(|doc| is_emergency_document(doc))
        .map(|doc| format!("{} {}", doc.title, doc.text))
        .collect();

    if texts.is_empty() {
        tracing::debug!("no emergency documents, phrase set is empty");
        return BTreeSet::new();
    }

    let phrases = frequent_ngrams(
        &texts,
        NgramRange::UNI_TO_TRI,
        min_freq,
        ENGLISH_STOP_WORDS,
    );
    tracing::debug!(
        documents = texts.len(),
        phrases = phrases.len(),
        "extracted emergency phrases"
    );
    phrases
}
