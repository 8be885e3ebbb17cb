use std::{collections::BTreeSet, path::Path};

use crate::{
    config_db::RankingConfig,
    document::Document,
    error::Result,
    store::DocumentStore,
    vocabulary::{Vocabulary, extract_emergency_phrases},
};

/// A loaded document store together with the statistics derived from it.
///
/// The vocabulary and emergency phrases are computed once per load; pogo
/// updates do not change them because they only touch counters.
#[derive(Debug)]
pub struct Corpus {
    store: DocumentStore,
    vocabulary: Vocabulary,
    phrases: BTreeSet<String>,
}

impl Corpus {
    pub fn load(path: &Path, config: &RankingConfig) -> Result<Self> {
        let store = DocumentStore::load(path)?;
        Ok(Self::from_store(store, config))
    }

    pub fn from_store(store: DocumentStore, config: &RankingConfig) -> Self {
        let vocabulary = Vocabulary::from_documents(store.documents());
        let phrases =
            extract_emergency_phrases(store.documents(), config.min_phrase_freq);
        tracing::info!(
            documents = store.len(),
            vocabulary = vocabulary.len(),
            phrases = phrases.len(),
            "corpus ready"
        );

        Self {
            store,
            vocabulary,
            phrases,
        }
    }

    pub fn documents(&self) -> &[Document] {
        self.store.documents()
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn phrases(&self) -> &BTreeSet<String> {
        &self.phrases
    }
}
