//! beacon - crisis-aware search over a flat JSON document store.
//!
//! Documents are matched by substring and ranked by trust, a penalty for
//! results users abandon quickly ("pogo-sticking"), an emergency boost for
//! crisis-related queries, and optionally freshness decay. Emergency
//! queries are recognised with phrases mined from the corpus itself.
//!
//! # Quick start
//!
//! ```no_run
//! use beacon::{Corpus, DataDir, ConfigDb, Session};
//! use beacon::cli::SearchArgs;
//! use beacon::search;
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let config = ConfigDb::open(&data_dir.config_db())
//!     .unwrap()
//!     .ranking_config()
//!     .unwrap();
//! let mut corpus = Corpus::load(&data_dir.documents(), &config).unwrap();
//!
//! let args = SearchArgs {
//!     query: "flood shelter".to_string(),
//!     count: 10,
//!     json: false,
//!     all: false,
//!     min_score: 0.0,
//!     no_autocorrect: false,
//!     freshness: false,
//! };
//! let outcome =
//!     search::execute_search(&args, &corpus, &config, chrono::Utc::now()).unwrap();
//!
//! let mut session = Session::new(config.pogo_threshold);
//! if let Some(top) = outcome.results.first() {
//!     session.open(&mut corpus, &top.doc.id, chrono::Utc::now()).unwrap();
//!     let feedback = session.back(&mut corpus, chrono::Utc::now()).unwrap();
//!     println!("{feedback:?}");
//! }
//! ```

pub mod cli;
pub mod config_db;
pub mod corpus;
pub mod data_dir;
pub mod document;
pub mod error;
pub mod ngram;
pub mod query;
pub mod scoring;
pub mod search;
pub mod session;
pub mod store;
pub mod text_util;
pub mod vocabulary;

pub use config_db::{ConfigDb, RankingConfig};
pub use corpus::Corpus;
pub use data_dir::DataDir;
pub use document::Document;
pub use error::{Error, Result};
pub use session::{Feedback, Session};
pub use store::DocumentStore;
pub use vocabulary::Vocabulary;
