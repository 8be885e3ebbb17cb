//! Pogo-stick detection.
//!
//! A [`Session`] tracks whether the user is looking at the result list or at
//! a single document. Returning to the results within the dwell threshold
//! counts as a quick return and bumps the document's `pogo` counter, which
//! is persisted immediately.

use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    corpus::Corpus,
    error::{Error, Result},
};

pub const DEFAULT_POGO_THRESHOLD: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Results,
    Viewing { id: String },
}

/// What happened when the user went back to the results.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// Dwell was below the threshold; the counter was incremented.
    QuickReturn {
        id: String,
        dwell: Duration,
        pogo: u32,
    },
    /// The user stayed long enough; nothing changed.
    Engaged { id: String, dwell: Duration },
}

impl Feedback {
    pub fn is_quick_return(&self) -> bool {
        matches!(self, Self::QuickReturn { .. })
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    view: View,
    opened_at: HashMap<String, DateTime<Utc>>,
    threshold: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_POGO_THRESHOLD)
    }
}

impl Session {
    pub fn new(threshold: Duration) -> Self {
        Self {
            view: View::Results,
            opened_at: HashMap::new(),
            threshold,
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Open document `id` at `now`.
    ///
    /// Opening while another document is already open leaves that document
    /// first, exactly as [`back`](Self::back) would, and returns its
    /// feedback.
    pub fn open(
        &mut self,
        corpus: &mut Corpus,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Feedback>> {
        if corpus.store().get(id).is_none() {
            return Err(Error::NotFound {
                kind: "document",
                name: id.to_string(),
            });
        }

        let left = self.back(corpus, now)?;
        self.opened_at.insert(id.to_string(), now);
        self.view = View::Viewing { id: id.to_string() };
        tracing::debug!(id, "opened document");
        Ok(left)
    }

    /// Return to the results at `now`.
    ///
    /// Returns `None` when no document was open. Otherwise measures dwell
    /// time since the matching [`open`](Self::open) and, for a quick return,
    /// increments the document's pogo counter and rewrites the store.
    ///
    /// If the rewrite fails the session stays on the document.
    pub fn back(
        &mut self,
        corpus: &mut Corpus,
        now: DateTime<Utc>,
    ) -> Result<Option<Feedback>> {
        let View::Viewing { id } = &self.view else {
            return Ok(None);
        };
        let id = id.clone();

        let opened = self.opened_at.get(&id).copied().unwrap_or(now);
        // Clock going backwards counts as zero dwell.
        let dwell = (now - opened).to_std().unwrap_or_default();

        if dwell < self.threshold {
            let pogo = corpus.store_mut().increment_pogo(&id)?;
            self.view = View::Results;
            tracing::info!(%id, dwell_ms = dwell.as_millis() as u64, pogo, "quick return detected");
            Ok(Some(Feedback::QuickReturn { id, dwell, pogo }))
        } else {
            self.view = View::Results;
            tracing::debug!(%id, dwell_ms = dwell.as_millis() as u64, "engaged, no penalty");
            Ok(Some(Feedback::Engaged { id, dwell }))
        }
    }
}
