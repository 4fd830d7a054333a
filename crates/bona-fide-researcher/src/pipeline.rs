//! Verification pipeline.
//!
//! Queries every configured source concurrently, aggregates the unified
//! results into ranked author buckets and returns the sorted aggregator.

use futures::future::join_all;

use crate::aggregator::ResultsAggregator;
use crate::config::Config;
use crate::error::VerifyError;
use crate::models::Researcher;
use crate::sources::{CrossrefSource, EoscSource, OrcidSource, SourceClient, VerificationSource};

/// Build the default source set: Crossref, ORCID and the EOSC Resource Hub,
/// sharing one HTTP client.
///
/// # Errors
///
/// Returns error if the HTTP client cannot be initialized.
pub fn default_sources(config: &Config) -> anyhow::Result<Vec<Box<dyn VerificationSource>>> {
    let client = SourceClient::new(config)?;

    Ok(vec![
        Box::new(CrossrefSource::new(client.clone(), config)),
        Box::new(OrcidSource::new(client.clone(), config)),
        Box::new(EoscSource::new(client, config)),
    ])
}

/// Verify a researcher against the given sources and return the ranked,
/// sorted aggregation of everything they returned.
///
/// Source failures are isolated: a failing source is logged and skipped,
/// and the remaining sources still contribute.
pub async fn verify_researcher(
    researcher: Researcher,
    config: &Config,
    sources: &[Box<dyn VerificationSource>],
) -> ResultsAggregator {
    tracing::info!(
        given_name = researcher.given_name_or_empty(),
        surname = researcher.surname_or_empty(),
        "starting researcher verification"
    );

    let queries = sources.iter().map(|source| {
        let researcher = &researcher;
        async move { (source.name(), source.verify(researcher).await) }
    });
    let outcomes = join_all(queries).await;

    let mut aggregator = ResultsAggregator::new(researcher, config.ranking.clone());

    for (name, outcome) in outcomes {
        match outcome {
            Ok(works) => {
                tracing::info!(source = name, count = works.len(), "source returned results");
                aggregator.add(works);
            }
            Err(error) => {
                let error = VerifyError::source(name, error);
                tracing::warn!(%error, "source failed, skipping its results");
            }
        }
    }

    aggregator.rank();
    aggregator.sort();

    tracing::info!(candidates = aggregator.bucket_count(), "verification finished");
    aggregator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SourceError, SourceResult};
    use crate::models::{Author, UnifiedWork};

    struct StaticSource {
        name: &'static str,
        works: Vec<UnifiedWork>,
    }

    #[async_trait::async_trait]
    impl VerificationSource for StaticSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn verify(&self, _researcher: &Researcher) -> SourceResult<Vec<UnifiedWork>> {
            Ok(self.works.clone())
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl VerificationSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn verify(&self, _researcher: &Researcher) -> SourceResult<Vec<UnifiedWork>> {
            Err(SourceError::server(500, "boom"))
        }
    }

    fn matched_work(source: &str, doi: &str) -> UnifiedWork {
        let mut author = Author::new(Some("Jane".to_string()), Some("Doe".to_string()));
        author.name_match_ratio = 200.0;

        let mut work = UnifiedWork::from_source(source);
        work.matched_author = Some(author);
        work.doi = Some(doi.to_string());
        work
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let config = Config::for_testing("http://127.0.0.1:0");
        let sources: Vec<Box<dyn VerificationSource>> = vec![
            Box::new(StaticSource { name: "static", works: vec![matched_work("static", "10.1/x")] }),
            Box::new(FailingSource),
        ];

        let aggregator =
            verify_researcher(Researcher::new("Jane", "Doe"), &config, &sources).await;

        assert_eq!(aggregator.bucket_count(), 1);
    }

    #[tokio::test]
    async fn test_same_doi_across_sources_is_merged() {
        let config = Config::for_testing("http://127.0.0.1:0");
        let sources: Vec<Box<dyn VerificationSource>> = vec![
            Box::new(StaticSource { name: "a", works: vec![matched_work("a", "10.1/x")] }),
            Box::new(StaticSource { name: "b", works: vec![matched_work("b", "10.1/x")] }),
        ];

        let aggregator =
            verify_researcher(Researcher::new("Jane", "Doe"), &config, &sources).await;

        assert_eq!(aggregator.bucket_count(), 1);
        let bucket = aggregator.buckets_sorted().next().unwrap();
        assert_eq!(bucket.work_count(), 1);
    }

    #[test]
    fn test_default_sources_builds_three_adapters() {
        let config = Config::for_testing("http://127.0.0.1:0");
        let sources = default_sources(&config).unwrap();
        assert_eq!(sources.len(), 3);
    }
}
