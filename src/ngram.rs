//! Document-frequency n-gram extraction.
//!
//! Counts contiguous word n-grams across a set of texts and keeps those that
//! occur in at least `min_df` distinct texts. Stop words are removed before
//! n-grams are formed, so "flood in the valley" yields the bigram
//! "flood valley".

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::text_util::word_tokens;

/// Inclusive range of n-gram lengths to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NgramRange {
    pub min: usize,
    pub max: usize,
}

impl NgramRange {
    pub const UNI_TO_TRI: Self = Self { min: 1, max: 3 };
}

/// Common English function words excluded from n-gram generation.
///
/// Trimmed relative to the usual "english" lists: content-bearing entries
/// such as "fire", "move", "bottom" or "system" are left out so they can
/// still form emergency phrases.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "about", "above", "across", "after", "afterwards", "again", "against",
    "all", "almost", "alone", "along", "already", "also", "although", "always",
    "am", "among", "amongst", "an", "and", "another", "any", "anyhow",
    "anyone", "anything", "anyway", "anywhere", "are", "around", "as", "at",
    "be", "became", "because", "become", "becomes", "becoming", "been",
    "before", "beforehand", "behind", "being", "below", "beside", "besides",
    "between", "beyond", "both", "but", "by", "can", "cannot", "could", "did",
    "do", "does", "doing", "done", "down", "due", "during", "each", "eg",
    "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every",
    "everyone", "everything", "everywhere", "except", "few", "for", "former",
    "formerly", "from", "further", "had", "has", "have", "having", "he",
    "hence", "her", "here", "hereafter", "hereby", "herein", "hers", "herself",
    "him", "himself", "his", "how", "however", "ie", "if", "in", "indeed",
    "into", "is", "it", "its", "itself", "just", "last", "latter", "least",
    "less", "many", "may", "me", "meanwhile", "might", "mine", "more",
    "moreover", "most", "mostly", "much", "must", "my", "myself", "namely",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none",
    "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often",
    "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise",
    "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps",
    "please", "rather", "same", "seem", "seemed", "seeming", "seems", "several",
    "she", "should", "since", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these",
    "they", "this", "those", "though", "through", "throughout", "thru", "thus",
    "to", "together", "too", "toward", "towards", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
    "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "whither", "who", "whoever", "whole", "whom", "whose", "why", "will",
    "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Return every n-gram in `range` that appears in at least `min_df` of
/// `texts`.
///
/// Tokens are lowercase alphanumeric runs of two or more characters. An
/// n-gram is counted once per text no matter how often it repeats there.
pub fn frequent_ngrams<S: AsRef<str>>(
    texts: &[S],
    range: NgramRange,
    min_df: usize,
    stop_words: &[&str],
) -> BTreeSet<String> {
    let stop: HashSet<&str> = stop_words.iter().copied().collect();
    let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

    for text in texts {
        let tokens: Vec<String> = word_tokens(text.as_ref())
            .filter(|t| !stop.contains(t.as_str()))
            .collect();

        let mut seen = HashSet::new();
        for n in range.min.max(1)..=range.max {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if seen.insert(gram.clone()) {
                    *document_frequency.entry(gram).or_default() += 1;
                }
            }
        }
    }

    document_frequency
        .into_iter()
        .filter(|(_, df)| *df >= min_df)
        .map(|(gram, _)| gram)
        .collect()
}
