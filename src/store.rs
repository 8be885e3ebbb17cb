use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::{
    document::{self, Document},
    error::{Error, Result},
};

/// The canonical in-memory document collection and the JSON file it came
/// from.
///
/// Every mutation is written back immediately with a full rewrite of the
/// file. Concurrent writers are not coordinated: the last rewrite wins.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    docs: Vec<Document>,
}

impl DocumentStore {
    /// Load and normalize the JSON array at `path`.
    ///
    /// A missing file is treated as an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "document store not found, starting empty");
            return Ok(Self {
                path: path.to_path_buf(),
                docs: Vec::new(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let raw: Value = serde_json::from_str(&content)?;
        let Value::Array(records) = raw else {
            return Err(Error::Config(format!(
                "document store must be a JSON array: {}",
                path.display()
            )));
        };

        let docs = document::normalize(&records)?;
        tracing::info!(path = %path.display(), documents = docs.len(), "loaded document store");

        Ok(Self {
            path: path.to_path_buf(),
            docs,
        })
    }

    /// Build a store from already-normalized documents. Nothing is written
    /// until [`save`](Self::save) or a mutation.
    pub fn from_documents(path: &Path, docs: Vec<Document>) -> Self {
        Self {
            path: path.to_path_buf(),
            docs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// First document with the given id.
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.docs.iter().find(|d| d.id == id)
    }

    /// Rewrite the whole file as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.docs)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), documents = self.docs.len(), "saved document store");
        Ok(())
    }

    /// Add one to the pogo counter of `id` and persist. Returns the new
    /// count.
    ///
    /// If the rewrite fails the in-memory counter is left at its previous
    /// value, so memory never runs ahead of the file.
    pub fn increment_pogo(&mut self, id: &str) -> Result<u32> {
        let idx = self
            .docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| Error::NotFound {
                kind: "document",
                name: id.to_string(),
            })?;

        let previous = self.docs[idx].pogo;
        let pogo = previous.saturating_add(1);
        self.docs[idx].pogo = pogo;
        if let Err(e) = self.save() {
            self.docs[idx].pogo = previous;
            return Err(e);
        }
        Ok(pogo)
    }
}
