//! Canonical document records and the normalizer that produces them.
//!
//! The backing store holds loosely-typed JSON objects. [`normalize`] turns
//! each into a [`Document`] with every field defaulted, keeping any field it
//! does not understand in [`Document::extra`] so the original shape survives
//! a rewrite of the store.

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_TRUST: f64 = 0.5;
pub const DEFAULT_METADATA: &str = "unknown";

/// Field names owned by the canonical form. Everything else goes to `extra`.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const TEXT: &str = "text";
    pub const TIMESTAMP: &str = "timestamp";
    pub const TRUST: &str = "trust";
    pub const POGO: &str = "pogo";
    pub const SOURCE: &str = "source";
    pub const SOURCE_TYPE: &str = "source_type";
    pub const LOCATION: &str = "location";

    pub const CANONICAL: &[&str] = &[
        ID,
        TITLE,
        TEXT,
        TIMESTAMP,
        TRUST,
        POGO,
        SOURCE,
        SOURCE_TYPE,
        LOCATION,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub text: String,
    /// RFC 3339 timestamp, or empty when unknown.
    pub timestamp: String,
    pub trust: f64,
    /// Number of quick returns recorded against this document.
    pub pogo: u32,
    pub source: String,
    pub source_type: String,
    pub location: String,
    /// Raw fields outside the canonical set, written back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Lowercased `title + " " + text`, the string queries are matched
    /// against.
    pub fn haystack(&self) -> String {
        format!("{} {}", self.title, self.text).to_lowercase()
    }
}

/// Normalize every raw record, failing on the first malformed one.
pub fn normalize(raw: &[Value]) -> Result<Vec<Document>> {
    raw.iter()
        .enumerate()
        .map(|(position, record)| normalize_record(position, record))
        .collect()
}

/// Normalize a single raw record found at `position` in the store.
pub fn normalize_record(position: usize, raw: &Value) -> Result<Document> {
    let Some(obj) = raw.as_object() else {
        return Err(Error::InvalidField {
            id: format!("#{position}"),
            field: "record",
            value: raw.to_string(),
        });
    };

    let id = match obj.get(fields::ID) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => format!("doc-{position}"),
    };

    let trust = parse_trust(&id, obj.get(fields::TRUST))?;
    let pogo = parse_pogo(&id, obj.get(fields::POGO))?;

    let extra = obj
        .iter()
        .filter(|(key, _)| !fields::CANONICAL.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(Document {
        title: text_field(obj, fields::TITLE, DEFAULT_TITLE),
        text: text_field(obj, fields::TEXT, ""),
        timestamp: timestamp_field(obj.get(fields::TIMESTAMP)),
        trust,
        pogo,
        source: text_field(obj, fields::SOURCE, DEFAULT_METADATA),
        source_type: text_field(obj, fields::SOURCE_TYPE, DEFAULT_METADATA),
        location: text_field(obj, fields::LOCATION, DEFAULT_METADATA),
        extra,
        id,
    })
}

fn text_field(obj: &Map<String, Value>, key: &str, default: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

fn timestamp_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Number(n)) => {
            epoch_to_rfc3339(n).unwrap_or_else(|| n.to_string())
        }
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Convert UNIX epoch seconds to an RFC 3339 UTC string.
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn epoch_to_rfc3339(n: &Number) -> Option<String> {
    if let Some(secs) = n.as_i64() {
        let dt = DateTime::from_timestamp(secs, 0)?;
        return Some(dt.to_rfc3339_opts(SecondsFormat::Secs, false));
    }

    let secs = n.as_f64()?;
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let dt = DateTime::from_timestamp(whole as i64, nanos)?;
    Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
}

fn parse_trust(id: &str, value: Option<&Value>) -> Result<f64> {
    let invalid = |v: &Value| Error::InvalidField {
        id: id.to_string(),
        field: fields::TRUST,
        value: v.to_string(),
    };

    let trust = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_TRUST),
        Some(v @ Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(v))?,
        Some(v @ Value::String(s)) => {
            s.trim().parse::<f64>().map_err(|_| invalid(v))?
        }
        Some(v) => return Err(invalid(v)),
    };

    if !trust.is_finite() {
        return Err(Error::InvalidField {
            id: id.to_string(),
            field: fields::TRUST,
            value: trust.to_string(),
        });
    }
    Ok(trust)
}

fn parse_pogo(id: &str, value: Option<&Value>) -> Result<u32> {
    let invalid = |v: &Value| Error::InvalidField {
        id: id.to_string(),
        field: fields::POGO,
        value: v.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(0),
        Some(v @ Value::Number(n)) => {
            if let Some(count) = n.as_u64() {
                u32::try_from(count).map_err(|_| invalid(v))
            } else {
                n.as_f64().and_then(whole_count).ok_or_else(|| invalid(v))
            }
        }
        Some(v @ Value::String(s)) => {
            let s = s.trim();
            s.parse::<u32>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_count))
                .ok_or_else(|| invalid(v))
        }
        Some(v) => Err(invalid(v)),
    }
}

fn whole_count(f: f64) -> Option<u32> {
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64)
        .then_some(f as u32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_get_defaults() {
        let doc = normalize_record(3, &json!({})).unwrap();

        assert_eq!(doc.id, "doc-3");
        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.text, "");
        assert_eq!(doc.timestamp, "");
        assert_eq!(doc.trust, DEFAULT_TRUST);
        assert_eq!(doc.pogo, 0);
        assert_eq!(doc.source, DEFAULT_METADATA);
        assert_eq!(doc.source_type, DEFAULT_METADATA);
        assert_eq!(doc.location, DEFAULT_METADATA);
        assert!(doc.extra.is_empty());
    }

    #[test]
    fn numeric_timestamp_becomes_rfc3339() {
        let doc =
            normalize_record(0, &json!({"id": 7, "timestamp": 1_700_000_000}))
                .unwrap();

        assert_eq!(doc.id, "7");
        assert_eq!(doc.timestamp, "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn fractional_timestamp_keeps_subseconds() {
        let doc =
            normalize_record(0, &json!({"timestamp": 1_700_000_000.5})).unwrap();
        assert_eq!(doc.timestamp, "2023-11-14T22:13:20.500+00:00");
    }

    #[test]
    fn string_timestamp_passes_through() {
        let doc = normalize_record(
            0,
            &json!({"timestamp": "2024-03-01T10:00:00Z"}),
        )
        .unwrap();
        assert_eq!(doc.timestamp, "2024-03-01T10:00:00Z");

        let doc = normalize_record(0, &json!({"timestamp": "yesterday"})).unwrap();
        assert_eq!(doc.timestamp, "yesterday");

        let doc = normalize_record(0, &json!({"timestamp": true})).unwrap();
        assert_eq!(doc.timestamp, "true");
    }

    #[test]
    fn numeric_strings_are_accepted_for_trust_and_pogo() {
        let doc =
            normalize_record(0, &json!({"trust": "0.75", "pogo": " 3 "})).unwrap();
        assert_eq!(doc.trust, 0.75);
        assert_eq!(doc.pogo, 3);

        let doc = normalize_record(0, &json!({"pogo": 2.0})).unwrap();
        assert_eq!(doc.pogo, 2);
    }

    #[test]
    fn malformed_trust_is_fatal() {
        let err = normalize_record(0, &json!({"id": "a", "trust": "high"}))
            .unwrap_err();
        match err {
            Error::InvalidField { id, field, .. } => {
                assert_eq!(id, "a");
                assert_eq!(field, "trust");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(normalize_record(0, &json!({"trust": "NaN"})).is_err());
        assert!(normalize_record(0, &json!({"trust": [1]})).is_err());
    }

    #[test]
    fn malformed_pogo_is_fatal() {
        assert!(normalize_record(0, &json!({"pogo": -1})).is_err());
        assert!(normalize_record(0, &json!({"pogo": 1.5})).is_err());
        assert!(normalize_record(0, &json!({"pogo": "lots"})).is_err());
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = normalize(&[json!({}), json!("oops")]).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: "record", .. }));
    }

    #[test]
    fn scalar_text_fields_are_stringified() {
        let doc = normalize_record(
            0,
            &json!({"title": 42, "text": null, "location": ["x"]}),
        )
        .unwrap();
        assert_eq!(doc.title, "42");
        assert_eq!(doc.text, "");
        assert_eq!(doc.location, DEFAULT_METADATA);
    }

    #[test]
    fn unknown_fields_are_kept_in_extra() {
        let doc = normalize_record(
            0,
            &json!({"id": "a", "author": "ops", "tags": ["flood"]}),
        )
        .unwrap();
        assert_eq!(doc.extra.get("author"), Some(&json!("ops")));
        assert_eq!(doc.extra.get("tags"), Some(&json!(["flood"])));

        let written = serde_json::to_value(&doc).unwrap();
        assert_eq!(written["author"], json!("ops"));
        assert_eq!(written["id"], json!("a"));
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = vec![
            json!({"id": 1, "title": "Flood warning", "timestamp": 1_700_000_000,
                   "trust": "0.9", "extra_field": {"k": 1}}),
            json!({"text": "no id", "timestamp": 1_700_000_000.25, "pogo": 4}),
            json!({"id": "c", "timestamp": "not a date", "source": 5}),
            json!({}),
        ];

        let once = normalize(&raw).unwrap();
        let rewritten: Vec<Value> = once
            .iter()
            .map(|d| serde_json::to_value(d).unwrap())
            .collect();
        let twice = normalize(&rewritten).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn haystack_joins_title_and_text() {
        let doc = normalize_record(
            0,
            &json!({"title": "Cyclone", "text": "Coastal ALERT"}),
        )
        .unwrap();
        assert_eq!(doc.haystack(), "cyclone coastal alert");
    }
}
