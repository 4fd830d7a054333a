//! EOSC Resource Hub verification source.
//!
//! Pages through the catalogue search and keeps items whose listed authors
//! contain a name match for the target researcher. One unified record is
//! produced per catalogue item, with the best-scoring author as the match.

use std::collections::BTreeSet;

use serde_json::Value;

use super::{SourceClient, VerificationSource, check_queryable_name, split_full_name};
use crate::config::{Config, api};
use crate::error::SourceResult;
use crate::matching::NameMatcher;
use crate::models::{Author, Institution, Researcher, UnifiedWork};

/// EOSC Resource Hub catalogue adapter.
#[derive(Debug, Clone)]
pub struct EoscSource {
    client: SourceClient,
    base_url: String,
    rows: usize,
    page_limit: usize,
    name_match_cutoff: f64,
}

impl EoscSource {
    /// Create the adapter from the service configuration.
    #[must_use]
    pub fn new(client: SourceClient, config: &Config) -> Self {
        Self {
            client,
            base_url: config.eosc_api_url.clone(),
            rows: api::EOSC_ROWS,
            page_limit: api::EOSC_PAGE_LIMIT,
            name_match_cutoff: config.ranking.name_match_cutoff,
        }
    }

    /// Institutions named by the item's `relevant_organizations`.
    fn parse_institutions(source: &Value) -> BTreeSet<Institution> {
        let mut institutions = BTreeSet::new();

        if let Some(organizations) = source.get("relevant_organizations").and_then(Value::as_array)
        {
            for org in organizations {
                let Some(name) = org.get("name").and_then(Value::as_str) else {
                    continue;
                };
                institutions.insert(Institution::new(
                    name,
                    org.get("ror").and_then(Value::as_str).map(str::to_string),
                    org.get("isni").and_then(Value::as_str).map(str::to_string),
                ));
            }
        }

        institutions
    }

    /// Map one catalogue item into a unified work, if any listed author
    /// clears the name-match cutoff.
    fn parse_item(
        &self,
        item: &Value,
        researcher: &Researcher,
        matcher: &NameMatcher,
    ) -> Option<UnifiedWork> {
        let source = item.get("source")?;
        let contributions = source.get("contributions").and_then(Value::as_array)?;
        let institutions = Self::parse_institutions(source);

        let mut matched: Option<Author> = None;
        let mut co_authors: BTreeSet<Author> = BTreeSet::new();

        for contribution in contributions {
            if !contribution
                .get("is_listed_author")
                .and_then(Value::as_bool)
                .unwrap_or(false)
            {
                continue;
            }

            let person = contribution.get("person").unwrap_or(&Value::Null);
            let full_name = person.get("full_name").and_then(Value::as_str).unwrap_or("");
            let Some((given, surname)) = split_full_name(full_name) else {
                continue;
            };

            let mut author = Author::new(Some(given.clone()), Some(surname.clone()));
            author.orcid = person.get("orcid").and_then(Value::as_str).map(str::to_string);
            // The catalogue attributes organizations to the item, not to
            // individual authors; every listed author inherits them.
            author.institutions = institutions.clone();

            let ratio = matcher.name_match_ratio(
                &given,
                &surname,
                researcher.given_name_or_empty(),
                researcher.surname_or_empty(),
            );

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

        let mut work = UnifiedWork::from_source("EOSC Resource Hub");
        work.matched_author = Some(matched);
        work.co_authors = co_authors;

        if let Some(identifiers) = source.get("identifiers").and_then(Value::as_array) {
            work.doi = identifiers
                .iter()
                .find(|id| id.get("scheme").and_then(Value::as_str) == Some("doi"))
                .and_then(|id| id.get("value").and_then(Value::as_str))
                .map(str::to_string);
        }

        // Titles are grouped by language; take the first non-empty group.
        if let Some(titles) = source.get("titles").and_then(Value::as_object) {
            work.title = titles
                .values()
                .filter_map(Value::as_array)
                .find_map(|group| group.first())
                .and_then(Value::as_str)
                .map(str::to_string);
        }

        if let Some(manifestations) = source.get("manifestations").and_then(Value::as_array) {
            for manifestation in manifestations {
                if let Some(url) = manifestation.get("url").and_then(Value::as_str) {
                    work.urls.insert(url.to_string());
                }
                if let Some(publisher) = manifestation
                    .get("venue")
                    .and_then(|venue| venue.get("name"))
                    .and_then(Value::as_str)
                {
                    work.publishers.insert(publisher.to_string());
                }
            }
        }

        if let Some(domains) = source.get("domain").and_then(Value::as_array) {
            for domain in domains {
                if let Some(name) = domain.get("domain").and_then(Value::as_str) {
                    work.domains.insert(name.to_string());
                }
            }
        }

        work.raw_data = item.to_string();
        Some(work)
    }
}

#[async_trait::async_trait]
impl VerificationSource for EoscSource {
    fn name(&self) -> &'static str {
        "EOSC Resource Hub"
    }

    async fn verify(&self, researcher: &Researcher) -> SourceResult<Vec<UnifiedWork>> {
        if !check_queryable_name(self.name(), researcher) {
            return Ok(Vec::new());
        }

        let matcher = NameMatcher::new(researcher.uncertain_name_order);
        // Token order does not matter in the catalogue's free-text search.
        let query =
            format!("{} {}", researcher.given_name_or_empty(), researcher.surname_or_empty());

        let mut works = Vec::new();

        for page in 0..self.page_limit {
            let params = vec![
                ("query".to_string(), query.clone()),
                ("exact".to_string(), "false".to_string()),
                ("catalogue".to_string(), "all".to_string()),
                ("page".to_string(), page.to_string()),
                ("orderBy".to_string(), "relevance".to_string()),
                ("order".to_string(), "desc".to_string()),
            ];

            let value = self.client.get_json(&self.base_url, &params).await?;

            let Some(items) =
                value.get("result").and_then(|r| r.get("items")).and_then(Value::as_array)
            else {
                break;
            };

            for item in items {
                if let Some(work) = self.parse_item(item, researcher, &matcher) {
                    works.push(work);
                }
            }

            tracing::debug!(page, items = items.len(), "fetched EOSC page");

            if items.len() < self.rows {
                break;
            }
        }

        tracing::info!(count = works.len(), "obtained researcher info from EOSC Resource Hub");
        Ok(works)
    }
}
