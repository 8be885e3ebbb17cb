use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    cli::SearchArgs,
    config_db::RankingConfig,
    corpus::Corpus,
    document::Document,
    error::Result,
    query::{self, Interpretation},
    scoring,
    text_util,
};

/// A matching document with its per-query score.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub rank: usize,
    pub score: f64,
    pub doc: Document,
}

/// Everything a caller needs to render one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: String,
    pub interpretation: Interpretation,
    pub results: Vec<ScoredDocument>,
}

/// Scan `docs` for `corrected` and rank the matches.
///
/// A document matches when `corrected` is a substring of its lowercased
/// title and text. Matches are sorted by score descending; the sort is
/// stable, so equal scores keep corpus order. An empty query matches
/// nothing.
pub fn retrieve(
    docs: &[Document],
    corrected: &str,
    is_emergency: bool,
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> Vec<ScoredDocument> {
    if corrected.is_empty() {
        return vec![];
    }

    let mut results: Vec<ScoredDocument> = docs
        .iter()
        .filter(|doc| doc.haystack().contains(corrected))
        .map(|doc| ScoredDocument {
            rank: 0,
            score: scoring::score_with(doc, is_emergency, config, now),
            doc: doc.clone(),
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    for (i, r) in results.iter_mut().enumerate() {
        r.rank = i + 1;
    }
    results
}

/// Execute the full search pipeline.
///
/// 1. Normalize and autocorrect the query (unless --no-autocorrect)
/// 2. Classify it as emergency or normal
/// 3. Scan and score matching documents
/// 4. Filter by --min-score and limit to -n results
pub fn execute_search(
    args: &SearchArgs,
    corpus: &Corpus,
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> Result<SearchOutcome> {
    let interpretation = if args.no_autocorrect {
        query::interpret_verbatim(&args.query, corpus.phrases())
    } else {
        query::interpret(
            &args.query,
            corpus.vocabulary(),
            corpus.phrases(),
            config.autocorrect_cutoff,
        )
    };

    let mut config = config.clone();
    if args.freshness {
        config.freshness = true;
    }

    tracing::debug!(
        query = %args.query,
        corrected = %interpretation.corrected,
        emergency = interpretation.is_emergency,
        "interpreted query"
    );

    let matches = retrieve(
        corpus.documents(),
        &interpretation.corrected,
        interpretation.is_emergency,
        &config,
        now,
    );

    let limit = if args.all { usize::MAX } else { args.count };
    let results: Vec<ScoredDocument> = matches
        .into_iter()
        .filter(|r| r.score >= args.min_score)
        .take(limit)
        .enumerate()
        .map(|(i, mut r)| {
            r.rank = i + 1;
            r
        })
        .collect();

    Ok(SearchOutcome {
        query: args.query.clone(),
        interpretation,
        results,
    })
}

/// Format results for human-readable terminal output.
pub fn format_human(outcome: &SearchOutcome, preview_chars: usize) {
    let interp = &outcome.interpretation;
    if interp.corrected != outcome.query.trim().to_lowercase() {
        println!("Showing results for '{}'", interp.corrected);
    }
    if interp.is_emergency {
        println!("Emergency mode: crisis-related results boosted");
    }

    if outcome.results.is_empty() {
        println!("No results found.");
        return;
    }

    for r in &outcome.results {
        println!("{:>3}. [{:.3}] {}", r.rank, r.score, r.doc.title);
        if !r.doc.timestamp.is_empty() {
            println!("     {}", r.doc.timestamp);
        }
        let preview = text_util::preview(&r.doc.text, preview_chars);
        if !preview.is_empty() {
            println!("     {preview}");
        }
    }
    println!("\n{} result(s)", outcome.results.len());
}

#[derive(Serialize)]
struct JsonOutcome<'a> {
    query: &'a str,
    corrected_query: &'a str,
    emergency: bool,
    result_count: usize,
    results: Vec<JsonResult<'a>>,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    rank: usize,
    score: f64,
    id: &'a str,
    title: &'a str,
    timestamp: &'a str,
    preview: String,
    trust: f64,
    pogo: u32,
    source: &'a str,
}

/// Render an outcome as a JSON value.
pub fn to_json(
    outcome: &SearchOutcome,
    preview_chars: usize,
) -> Result<serde_json::Value> {
    let view = JsonOutcome {
        query: &outcome.query,
        corrected_query: &outcome.interpretation.corrected,
        emergency: outcome.interpretation.is_emergency,
        result_count: outcome.results.len(),
        results: outcome
            .results
            .iter()
            .map(|r| JsonResult {
                rank: r.rank,
                score: r.score,
                id: &r.doc.id,
                title: &r.doc.title,
                timestamp: &r.doc.timestamp,
                preview: text_util::preview(&r.doc.text, preview_chars),
                trust: r.doc.trust,
                pogo: r.doc.pogo,
                source: &r.doc.source,
            })
            .collect(),
    };
    Ok(serde_json::to_value(view)?)
}

/// Format results as JSON output.
pub fn format_json(outcome: &SearchOutcome, preview_chars: usize) -> Result<()> {
    let value = to_json(outcome, preview_chars)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
