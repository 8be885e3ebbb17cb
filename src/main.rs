use std::{
    io::{BufRead, Write},
    ops::ControlFlow,
    path::Path,
};

use beacon::{
    cli::{Cli, Command, PhrasesArgs, SearchArgs, SettingsAction},
    config_db::{ConfigDb, RankingConfig, keys},
    corpus::Corpus,
    data_dir::DataDir,
    error,
    search::{self, ScoredDocument},
    session::{Feedback, Session},
    store::DocumentStore,
};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("BEACON_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let config_db = ConfigDb::open(&data_dir.config_db())?;
    let store_path = cli.store.clone().unwrap_or_else(|| data_dir.documents());

    match cli.command {
        Command::Search(args) => {
            let config = config_db.ranking_config()?;
            let corpus = Corpus::load(&store_path, &config)?;
            let outcome =
                search::execute_search(&args, &corpus, &config, Utc::now())?;

            if args.json {
                search::format_json(&outcome, config.preview_chars)?;
            } else {
                search::format_human(&outcome, config.preview_chars);
            }
        }
        Command::Browse => {
            let config = config_db.ranking_config()?;
            let mut corpus = Corpus::load(&store_path, &config)?;
            cmd_browse(&mut corpus, &config)?;
        }
        Command::Phrases(args) => {
            let config = config_db.ranking_config()?;
            let corpus = Corpus::load(&store_path, &config)?;
            cmd_phrases(&corpus, &args)?;
        }
        Command::Normalize => {
            cmd_normalize(&store_path)?;
        }
        Command::Status(args) => {
            cmd_status(&config_db, &data_dir, &store_path, args.json)?;
        }
        Command::Settings { action } => match action {
            SettingsAction::Show { json } => {
                settings_show(&config_db, json)?;
            }
            SettingsAction::Set { key, value } => {
                config_db.set_ranking_setting(&key, &value)?;
                println!("Set {key} = {value}");
            }
            SettingsAction::Clear { key } => {
                if !config_db.remove_setting(&key)? {
                    return Err(error::Error::NotFound {
                        kind: "setting",
                        name: key,
                    });
                }
                println!("Cleared {key}");
            }
        },
        Command::Completions(args) => args.generate(),
    }

    Ok(())
}

fn cmd_browse(corpus: &mut Corpus, config: &RankingConfig) -> error::Result<()> {
    let mut session = Session::new(config.pogo_threshold);
    let mut results: Vec<ScoredDocument> = Vec::new();

    println!("Type a query, 'open <n>', 'back' or 'quit'.");
    prompt()?;

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match browse_line(line.trim(), corpus, config, &mut session, &mut results) {
            Ok(ControlFlow::Break(())) => break,
            Ok(ControlFlow::Continue(())) => {}
            Err(e) => eprintln!("error: {e}"),
        }
        prompt()?;
    }

    // Leaving while a document is open still counts as a return.
    if let Some(feedback) = session.back(corpus, Utc::now())? {
        print_feedback(&feedback);
    }
    Ok(())
}

fn prompt() -> error::Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn browse_line(
    input: &str,
    corpus: &mut Corpus,
    config: &RankingConfig,
    session: &mut Session,
    results: &mut Vec<ScoredDocument>,
) -> error::Result<ControlFlow<()>> {
    match input.split_once(' ').unwrap_or((input, "")) {
        ("", _) => {}
        ("quit" | "exit", _) => return Ok(ControlFlow::Break(())),
        ("back", _) => match session.back(corpus, Utc::now())? {
            Some(feedback) => print_feedback(&feedback),
            None => println!("Not viewing a document."),
        },
        ("open", rank) => {
            let Some(hit) = rank
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| results.iter().find(|r| r.rank == n))
            else {
                println!("No result numbered '{}'.", rank.trim());
                return Ok(ControlFlow::Continue(()));
            };
            // Opening another result also leaves the current one.
            if let Some(feedback) = session.open(corpus, &hit.doc.id, Utc::now())? {
                print_feedback(&feedback);
            }
            let doc = &hit.doc;
            println!("--- {} ---", doc.title);
            if !doc.timestamp.is_empty() {
                println!("{}", doc.timestamp);
            }
            println!("{}\n", doc.text);
            println!("Source: {} ({}), {}", doc.source, doc.source_type, doc.location);
        }
        _ => {
            // A new query navigates away from any open document.
            if let Some(feedback) = session.back(corpus, Utc::now())? {
                print_feedback(&feedback);
            }
            let args = SearchArgs {
                query: input.to_string(),
                count: 10,
                json: false,
                all: false,
                min_score: 0.0,
                no_autocorrect: false,
                freshness: false,
            };
            let outcome =
                search::execute_search(&args, corpus, config, Utc::now())?;
            search::format_human(&outcome, config.preview_chars);
            *results = outcome.results;
        }
    }
    Ok(ControlFlow::Continue(()))
}

fn print_feedback(feedback: &Feedback) {
    match feedback {
        Feedback::QuickReturn { dwell, pogo, .. } => println!(
            "Quick return detected after {:.1}s (pogo = {pogo}).",
            dwell.as_secs_f64()
        ),
        Feedback::Engaged { dwell, .. } => println!(
            "Engaged for {:.1}s, no penalty.",
            dwell.as_secs_f64()
        ),
    }
}

fn cmd_phrases(corpus: &Corpus, args: &PhrasesArgs) -> error::Result<()> {
    if args.json {
        let value = serde_json::json!({
            "vocabulary_size": corpus.vocabulary().len(),
            "phrases": corpus.phrases(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if corpus.phrases().is_empty() {
        println!("No emergency phrases extracted.");
    } else {
        for phrase in corpus.phrases() {
            println!("{phrase}");
        }
        println!(
            "\n{} phrase(s), vocabulary of {} word(s)",
            corpus.phrases().len(),
            corpus.vocabulary().len()
        );
    }
    Ok(())
}

fn cmd_normalize(store_path: &Path) -> error::Result<()> {
    if !store_path.exists() {
        return Err(error::Error::NotFound {
            kind: "document store",
            name: store_path.display().to_string(),
        });
    }
    let store = DocumentStore::load(store_path)?;
    store.save()?;
    println!(
        "Normalized {} document(s) in {}",
        store.len(),
        store_path.display()
    );
    Ok(())
}

fn cmd_status(
    config_db: &ConfigDb,
    data_dir: &DataDir,
    store_path: &Path,
    json: bool,
) -> error::Result<()> {
    let config = config_db.ranking_config()?;
    let corpus = Corpus::load(store_path, &config)?;
    let penalized = corpus.documents().iter().filter(|d| d.pogo > 0).count();

    if json {
        let value = serde_json::json!({
            "data_dir": data_dir.root(),
            "store": store_path,
            "documents": corpus.documents().len(),
            "penalized_documents": penalized,
            "vocabulary": corpus.vocabulary().len(),
            "emergency_phrases": corpus.phrases().len(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("Data directory: {}", data_dir.root().display());
        println!("Store: {}", store_path.display());
        println!("Documents: {}", corpus.documents().len());
        println!("Penalized documents: {penalized}");
        println!("Vocabulary: {}", corpus.vocabulary().len());
        println!("Emergency phrases: {}", corpus.phrases().len());
    }
    Ok(())
}

fn settings_show(config_db: &ConfigDb, json: bool) -> error::Result<()> {
    let config = config_db.ranking_config()?;
    let stored = config_db.list_settings()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let effective = [
        (
            keys::POGO_THRESHOLD_SECS,
            config.pogo_threshold.as_secs_f64().to_string(),
        ),
        (
            keys::AUTOCORRECT_CUTOFF,
            config.autocorrect_cutoff.to_string(),
        ),
        (
            keys::MIN_PHRASE_FREQ,
            config.min_phrase_freq.to_string(),
        ),
        (keys::FRESHNESS, config.freshness.to_string()),
        (
            keys::PREVIEW_CHARS,
            config.preview_chars.to_string(),
        ),
    ];
    for (key, value) in effective {
        let origin = if stored.iter().any(|(k, _)| k == key) {
            "stored"
        } else {
            "default"
        };
        println!("{key}\t{value}\t({origin})");
    }
    Ok(())
}
