use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "beacon",
    about = "Crisis-aware document search with pogo-stick relevance feedback"
)]
pub struct Cli {
    /// Override the XDG data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Use this JSON document store instead of <data-dir>/documents.json
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the document store
    Search(SearchArgs),
    /// Interactive session: search, open results and go back
    Browse,
    /// Show the emergency phrases extracted from the corpus
    Phrases(PhrasesArgs),
    /// Rewrite the document store in canonical form
    Normalize,
    /// Show system status and statistics
    Status(StatusArgs),
    /// Manage persisted ranking settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Number of results to return
    #[arg(short = 'n', long, default_value = "10")]
    pub count: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Return all results above the score threshold
    #[arg(long)]
    pub all: bool,

    /// Minimum score threshold
    #[arg(long, default_value = "0.0")]
    pub min_score: f64,

    /// Match the query exactly as typed, without spelling correction
    #[arg(long)]
    pub no_autocorrect: bool,

    /// Multiply freshness decay into scores for this search
    #[arg(long)]
    pub freshness: bool,
}

// -- Phrases --

#[derive(Debug, Parser)]
pub struct PhrasesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Status --

#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Settings --

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Show the effective ranking settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Persist a ranking setting in config.redb
    Set {
        /// One of: pogo_threshold_secs, autocorrect_cutoff,
        /// min_phrase_freq, freshness, preview_chars
        key: String,
        value: String,
    },
    /// Clear a stored setting (revert to default)
    Clear { key: String },
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "beacon",
            &mut std::io::stdout(),
        );
    }
}
