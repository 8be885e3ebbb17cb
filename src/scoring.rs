//! Relevance scoring.
//!
//! A score is a product of independent factors:
//!
//! * the document's `trust`,
//! * a pogo penalty of 5% per quick return, capped at 50%,
//! * a 1.3x boost when the query is classified as an emergency,
//! * optionally, exponential freshness decay by document age.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{config_db::RankingConfig, document::Document};

pub const POGO_PENALTY_STEP: f64 = 0.05;
pub const MAX_POGO_PENALTY: f64 = 0.5;
pub const EMERGENCY_BOOST: f64 = 1.3;

/// Freshness decay per hour of age for emergency queries.
pub const EMERGENCY_DECAY: f64 = 0.08;
/// Freshness decay per hour of age for normal queries.
pub const NORMAL_DECAY: f64 = 0.02;

/// Fraction of the score removed for `pogo` quick returns.
pub fn pogo_penalty(pogo: u32) -> f64 {
    (POGO_PENALTY_STEP * f64::from(pogo)).min(MAX_POGO_PENALTY)
}

/// Trust, pogo penalty and emergency boost. Never fails.
pub fn score(doc: &Document, is_emergency: bool) -> f64 {
    let boost = if is_emergency { EMERGENCY_BOOST } else { 1.0 };
    doc.trust * (1.0 - pogo_penalty(doc.pogo)) * boost
}

/// [`score`], multiplied by [`freshness_score`] when the configuration asks
/// for it.
pub fn score_with(
    doc: &Document,
    is_emergency: bool,
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> f64 {
    let base = score(doc, is_emergency);
    if config.freshness {
        base * freshness_score(&doc.timestamp, is_emergency, now)
    } else {
        base
    }
}

/// `exp(-lambda * hours_old)`, with a faster decay for emergency queries.
///
/// Missing or unparseable timestamps score 1.0 so a bad date never zeroes a
/// document out.
pub fn freshness_score(
    timestamp: &str,
    is_emergency: bool,
    now: DateTime<Utc>,
) -> f64 {
    let Some(doc_time) = parse_timestamp(timestamp) else {
        return 1.0;
    };

    let hours_old = (now - doc_time).num_milliseconds() as f64 / 3_600_000.0;
    let lambda = if is_emergency {
        EMERGENCY_DECAY
    } else {
        NORMAL_DECAY
    };
    (-lambda * hours_old).exp()
}

/// Parse the timestamp forms found in document stores.
///
/// Accepts RFC 3339, ISO date-times with a space separator, naive ISO
/// date-times and bare dates (both taken as UTC), and epoch seconds.
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    let s = timestamp.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    if let Ok(secs) = s.parse::<f64>()
        && secs.is_finite()
    {
        let millis = (secs * 1000.0).round();
        if millis.abs() < i64::MAX as f64 {
            return DateTime::from_timestamp_millis(millis as i64);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use super::*;
    use crate::document::normalize_record;

    fn doc(trust: f64, pogo: u32) -> Document {
        normalize_record(0, &json!({"trust": trust, "pogo": pogo})).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn hours_ago(h: i64) -> String {
        (now() - Duration::hours(h)).to_rfc3339()
    }

    #[test]
    fn base_score_is_trust() {
        assert_eq!(score(&doc(0.9, 0), false), 0.9);
    }

    #[test]
    fn pogo_penalty_is_five_percent_per_return() {
        let s = score(&doc(1.0, 4), false);
        assert!((s - 0.8).abs() < 1e-12);
    }

    #[test]
    fn pogo_penalty_is_clamped() {
        assert_eq!(pogo_penalty(10), MAX_POGO_PENALTY);
        assert_eq!(pogo_penalty(100), pogo_penalty(10));
        assert_eq!(pogo_penalty(u32::MAX), MAX_POGO_PENALTY);
        assert_eq!(score(&doc(0.8, 100), false), score(&doc(0.8, 10), false));
    }

    #[test]
    fn scores_are_never_negative() {
        for trust in [0.0, 0.25, 0.5, 1.0] {
            for pogo in [0, 1, 9, 10, 11, 1000] {
                for emergency in [false, true] {
                    assert!(score(&doc(trust, pogo), emergency) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn emergency_boost_is_thirty_percent() {
        let d = doc(0.7, 3);
        let normal = score(&d, false);
        let boosted = score(&d, true);
        assert!((boosted - 1.3 * normal).abs() < 1e-12);
    }

    #[test]
    fn freshness_of_missing_timestamp_is_neutral() {
        assert_eq!(freshness_score("", false, now()), 1.0);
        assert_eq!(freshness_score("", true, now()), 1.0);
        assert_eq!(freshness_score("last tuesday", true, now()), 1.0);
    }

    #[test]
    fn freshness_decreases_with_age() {
        let recent = freshness_score(&hours_ago(1), false, now());
        let older = freshness_score(&hours_ago(48), false, now());
        assert!(recent > older);
        assert!(recent < 1.0);
    }

    #[test]
    fn emergency_decays_faster() {
        let ts = hours_ago(10);
        let normal = freshness_score(&ts, false, now());
        let emergency = freshness_score(&ts, true, now());
        assert!(emergency < normal);
        assert!((normal - (-0.2f64).exp()).abs() < 1e-9);
        assert!((emergency - (-0.8f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn parses_supported_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 31, 12, 0, 0).unwrap();
        for ts in [
            "2024-05-31T12:00:00Z",
            "2024-05-31T12:00:00+00:00",
            "2024-05-31T14:00:00+02:00",
            "2024-05-31 12:00:00+00:00",
            "2024-05-31T12:00:00",
            "2024-05-31 12:00:00",
            "1717156800",
        ] {
            assert_eq!(parse_timestamp(ts), Some(expected), "{ts}");
        }

        assert_eq!(
            parse_timestamp("2024-05-31"),
            Some(Utc.with_ymd_and_hms(2024, 5, 31, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("soon"), None);
    }

    #[test]
    fn score_with_only_applies_freshness_when_enabled() {
        let mut d = doc(1.0, 0);
        d.timestamp = hours_ago(24);

        let mut config = RankingConfig::default();
        assert_eq!(score_with(&d, false, &config, now()), 1.0);

        config.freshness = true;
        let fresh = score_with(&d, false, &config, now());
        assert!((fresh - (-0.48f64).exp()).abs() < 1e-9);
    }
}
