//! Bona Fide Researcher
//!
//! Verifies that a claimed researcher identity corresponds to a real,
//! publishing researcher. Queries public bibliographic and registry APIs
//! (Crossref, ORCID, the EOSC Resource Hub), fuzzy-matches candidate author
//! names against the claim, merges the evidence across sources and ranks
//! the resulting candidate identities.
//!
//! # Features
//!
//! - **Fuzzy name matching**: Levenshtein-based, initial-aware, tolerant of
//!   uncertain given-name/surname order
//! - **Cross-source merging**: candidates deduplicated by ORCID or name,
//!   their works deduplicated by DOI
//! - **Explainable ranking**: every candidate carries a per-attribute rank
//!   breakdown
//! - **Async-first**: sources are queried concurrently on Tokio
//!
//! # Example
//!
//! ```no_run
//! use bona_fide_researcher::{config::Config, models::Researcher, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let sources = pipeline::default_sources(&config)?;
//!
//!     let researcher = Researcher::new("Jane", "Doe");
//!     let results = pipeline::verify_researcher(researcher, &config, &sources).await;
//!
//!     for summary in results.summaries(Some(10)) {
//!         println!("{:?} {:?}: {}", summary.given_name, summary.surname, summary.internal_rank);
//!     }
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod formatters;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod rank;
pub mod server;
pub mod sources;

pub use aggregator::ResultsAggregator;
pub use config::Config;
pub use error::{SourceError, VerifyError};
pub use matching::NameMatcher;
pub use models::Researcher;
