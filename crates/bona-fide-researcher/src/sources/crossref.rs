//! Crossref verification source.
//!
//! Searches `api.crossref.org/works` by author name with cursor pagination
//! and keeps the works whose author list contains a name match for the
//! target researcher.

use std::collections::BTreeSet;

use serde_json::Value;

use super::{SourceClient, VerificationSource, check_queryable_name, domain_of};
use crate::config::{Config, api};
use crate::error::SourceResult;
use crate::matching::NameMatcher;
use crate::models::{Author, Institution, Researcher, UnifiedWork};

/// Crossref works adapter.
#[derive(Debug, Clone)]
pub struct CrossrefSource {
    client: SourceClient,
    base_url: String,
    rows: usize,
    page_limit: usize,
    name_match_cutoff: f64,
}

impl CrossrefSource {
    /// Create the adapter from the service configuration.
    #[must_use]
    pub fn new(client: SourceClient, config: &Config) -> Self {
        Self {
            client,
            base_url: config.crossref_api_url.clone(),
            rows: api::CROSSREF_ROWS,
            page_limit: api::CROSSREF_PAGE_LIMIT,
            name_match_cutoff: config.ranking.name_match_cutoff,
        }
    }

    /// Map one Crossref item into a unified work, if any of its authors
    /// clears the name-match cutoff.
    fn parse_item(
        &self,
        item: &Value,
        researcher: &Researcher,
        matcher: &NameMatcher,
    ) -> Option<UnifiedWork> {
        let authors = item.get("author")?.as_array()?;

        let mut matched: Option<Author> = None;
        let mut co_authors: BTreeSet<Author> = BTreeSet::new();

        for author_value in authors {
            let given = author_value.get("given").and_then(Value::as_str).unwrap_or("");
            let family = author_value.get("family").and_then(Value::as_str).unwrap_or("");

            let mut author = Author::new(
                Some(given.to_string()).filter(|s| !s.is_empty()),
                Some(family.to_string()).filter(|s| !s.is_empty()),
            );

            if let Some(affiliations) = author_value.get("affiliation").and_then(Value::as_array) {
                for affiliation in affiliations {
                    if let Some(name) = affiliation.get("name").and_then(Value::as_str) {
                        author.institutions.insert(Institution::from_name(name));
                    }
                }
            }

            let ratio = matcher.name_match_ratio(
                given,
                family,
                researcher.given_name_or_empty(),
                researcher.surname_or_empty(),
            );

            // Keep the best-scoring author above the cutoff as the match.
            if ratio >= self.name_match_cutoff
                && matched.as_ref().is_none_or(|m| ratio > m.name_match_ratio)
            {
                if let Some(previous) = matched.take() {
                    co_authors.insert(previous);
                }
                author.name_match_ratio = ratio;
                matched = Some(author);
            } else {
                co_authors.insert(author);
            }
        }

        let matched = matched?;

        let mut work = UnifiedWork::from_source("Crossref");
        work.matched_author = Some(matched);
        work.co_authors = co_authors;
        work.doi = item.get("DOI").and_then(Value::as_str).map(str::to_string);
        work.title = item
            .get("title")
            .and_then(Value::as_array)
            .and_then(|titles| titles.first())
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(url) = item.get("URL").and_then(Value::as_str) {
            work.urls.insert(url.to_string());
            if let Some(domain) = domain_of(url) {
                work.domains.insert(domain);
            }
        }

        if let Some(publisher) = item.get("publisher").and_then(Value::as_str) {
            work.publishers.insert(publisher.to_string());
        }

        work.raw_data = item.to_string();
        Some(work)
    }
}

#[async_trait::async_trait]
impl VerificationSource for CrossrefSource {
    fn name(&self) -> &'static str {
        "Crossref"
    }

    async fn verify(&self, researcher: &Researcher) -> SourceResult<Vec<UnifiedWork>> {
        if !check_queryable_name(self.name(), researcher) {
            return Ok(Vec::new());
        }

        let matcher = NameMatcher::new(researcher.uncertain_name_order);
        let query =
            format!("{} {}", researcher.given_name_or_empty(), researcher.surname_or_empty());

        let mut works = Vec::new();
        let mut cursor = "*".to_string();

        for page in 0..self.page_limit {
            let params = vec![
                ("query.author".to_string(), query.clone()),
                ("cursor".to_string(), cursor.clone()),
                ("rows".to_string(), self.rows.to_string()),
            ];

            let value = self.client.get_json(&self.base_url, &params).await?;
            let message = &value["message"];

            let Some(items) = message.get("items").and_then(Value::as_array) else {
                break;
            };

            for item in items {
                if let Some(work) = self.parse_item(item, researcher, &matcher) {
                    works.push(work);
                }
            }

            tracing::debug!(page, items = items.len(), "fetched Crossref page");

            match message.get("next-cursor").and_then(Value::as_str) {
                Some(next) if items.len() >= self.rows => cursor = next.to_string(),
                _ => break,
            }
        }

        tracing::info!(count = works.len(), "obtained researcher info from Crossref");
        Ok(works)
    }
}
