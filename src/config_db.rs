use std::{path::Path, time::Duration};

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::{
    error::{Error, Result},
    query::DEFAULT_AUTOCORRECT_CUTOFF,
    session::DEFAULT_POGO_THRESHOLD,
    text_util::DEFAULT_PREVIEW_CHARS,
    vocabulary::DEFAULT_MIN_PHRASE_FREQ,
};

const SETTINGS: TableDefinition<&str, &str> = TableDefinition::new("settings");

/// Setting keys understood by [`RankingConfig`].
pub mod keys {
    pub const POGO_THRESHOLD_SECS: &str = "pogo_threshold_secs";
    pub const AUTOCORRECT_CUTOFF: &str = "autocorrect_cutoff";
    pub const MIN_PHRASE_FREQ: &str = "min_phrase_freq";
    pub const FRESHNESS: &str = "freshness";
    pub const PREVIEW_CHARS: &str = "preview_chars";

    pub const ALL: &[&str] = &[
        POGO_THRESHOLD_SECS,
        AUTOCORRECT_CUTOFF,
        MIN_PHRASE_FREQ,
        FRESHNESS,
        PREVIEW_CHARS,
    ];
}

/// Tunables for query interpretation, scoring and pogo detection.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankingConfig {
    /// Dwell times strictly below this count as a quick return.
    #[serde(rename = "pogo_threshold_secs", serialize_with = "as_secs")]
    pub pogo_threshold: Duration,
    /// Minimum similarity for an autocorrect substitution.
    pub autocorrect_cutoff: f64,
    /// Minimum number of emergency documents a phrase must appear in.
    pub min_phrase_freq: usize,
    /// Multiply freshness decay into the relevance score.
    pub freshness: bool,
    /// Characters of body text shown in result listings.
    pub preview_chars: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            pogo_threshold: DEFAULT_POGO_THRESHOLD,
            autocorrect_cutoff: DEFAULT_AUTOCORRECT_CUTOFF,
            min_phrase_freq: DEFAULT_MIN_PHRASE_FREQ,
            freshness: false,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl RankingConfig {
    /// Apply a single `key = value` setting on top of the current values.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || Error::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            keys::POGO_THRESHOLD_SECS => {
                let secs: f64 = value.parse().map_err(|_| invalid())?;
                self.pogo_threshold =
                    Duration::try_from_secs_f64(secs).map_err(|_| invalid())?;
            }
            keys::AUTOCORRECT_CUTOFF => {
                let cutoff: f64 = value.parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&cutoff) {
                    return Err(invalid());
                }
                self.autocorrect_cutoff = cutoff;
            }
            keys::MIN_PHRASE_FREQ => {
                let freq: usize = value.parse().map_err(|_| invalid())?;
                if freq == 0 {
                    return Err(invalid());
                }
                self.min_phrase_freq = freq;
            }
            keys::FRESHNESS => {
                self.freshness = parse_bool(value).ok_or_else(invalid)?;
            }
            keys::PREVIEW_CHARS => {
                self.preview_chars = value.parse().map_err(|_| invalid())?;
            }
            _ => {
                return Err(Error::NotFound {
                    kind: "setting",
                    name: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn as_secs<S: serde::Serializer>(
    d: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(d.as_secs_f64())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

pub struct ConfigDb {
    db: Database,
}

impl ConfigDb {
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        // Ensure the table exists by opening it in a write transaction.
        let txn = db.begin_write()?;
        txn.open_table(SETTINGS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    pub fn remove_setting(&self, key: &str) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(SETTINGS)?;
            table.remove(key)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    pub fn list_settings(&self) -> Result<Vec<(String, String)>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(SETTINGS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            result.push((k.value().to_string(), v.value().to_string()));
        }
        Ok(result)
    }

    /// Validate and persist a ranking setting.
    pub fn set_ranking_setting(&self, key: &str, value: &str) -> Result<()> {
        RankingConfig::default().apply(key, value)?;
        self.set_setting(key, value)
    }

    /// Build the effective ranking configuration: defaults overlaid with
    /// every stored setting.
    pub fn ranking_config(&self) -> Result<RankingConfig> {
        let mut config = RankingConfig::default();
        for (key, value) in self.list_settings()? {
            if keys::ALL.contains(&key.as_str()) {
                config.apply(&key, &value)?;
            } else {
                tracing::warn!(%key, "ignoring unknown stored setting");
            }
        }
        Ok(config)
    }
}

impl std::fmt::Debug for ConfigDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigDb").finish_non_exhaustive()
    }
}
