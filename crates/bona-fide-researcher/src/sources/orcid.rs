//! ORCID verification source.
//!
//! Queries the public ORCID expanded-search API for registry records whose
//! name clears the match cutoff. ORCID records describe people rather than
//! publications, so each match becomes a work record carrying only the
//! matched author.

use std::collections::BTreeSet;

use serde_json::Value;

use super::{SourceClient, VerificationSource, check_queryable_name};
use crate::config::{Config, api};
use crate::error::SourceResult;
use crate::matching::NameMatcher;
use crate::models::{Author, Institution, Researcher, UnifiedWork};

/// ORCID expanded-search adapter.
#[derive(Debug, Clone)]
pub struct OrcidSource {
    client: SourceClient,
    base_url: String,
    rows: usize,
    name_match_cutoff: f64,
}

impl OrcidSource {
    /// Create the adapter from the service configuration.
    #[must_use]
    pub fn new(client: SourceClient, config: &Config) -> Self {
        Self {
            client,
            base_url: config.orcid_api_url.clone(),
            rows: api::ORCID_ROWS,
            name_match_cutoff: config.ranking.name_match_cutoff,
        }
    }

    /// Build the expanded-search query from the researcher attributes that
    /// are actually present, OR-joined so any of them can recall a record.
    fn build_query(researcher: &Researcher, given_name: &str, surname: &str) -> String {
        let mut clauses = vec![
            format!("family-name:{surname}"),
            format!("given-names:{given_name}"),
        ];

        if let Some(orcid) = researcher.orcid.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(format!("orcid:{orcid}"));
        }
        if let Some(email) = researcher.email.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(format!("email:{email}"));
        }
        if let Some(affiliation) = researcher.affiliation.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(format!("current-institution-affiliation-name:{affiliation}"));
            clauses.push(format!("past-institution-affiliation-name:{affiliation}"));
        }

        clauses.join(" OR ")
    }

    /// Map one expanded-search record into a unified work, if its name
    /// clears the cutoff.
    fn parse_record(
        &self,
        record: &Value,
        researcher: &Researcher,
        matcher: &NameMatcher,
    ) -> Option<UnifiedWork> {
        let given = record.get("given-names").and_then(Value::as_str).unwrap_or("");
        let family = record.get("family-names").and_then(Value::as_str).unwrap_or("");

        let ratio = matcher.name_match_ratio(
            given,
            family,
            researcher.given_name_or_empty(),
            researcher.surname_or_empty(),
        );
        if ratio < self.name_match_cutoff {
            return None;
        }

        let mut author = Author::new(
            Some(given.to_string()).filter(|s| !s.is_empty()),
            Some(family.to_string()).filter(|s| !s.is_empty()),
        );
        author.name_match_ratio = ratio;
        author.orcid = record.get("orcid-id").and_then(Value::as_str).map(str::to_string);

        if let Some(emails) = record.get("email").and_then(Value::as_array) {
            for email in emails.iter().filter_map(Value::as_str) {
                author.emails.insert(email.to_string());
            }
        }

        if let Some(names) = record.get("institution-name").and_then(Value::as_array) {
            for name in names.iter().filter_map(Value::as_str) {
                author.institutions.insert(Institution::from_name(name));
            }
        }

        let mut work = UnifiedWork::from_source("ORCID");
        work.matched_author = Some(author);
        work.raw_data = record.to_string();
        Some(work)
    }
}

#[async_trait::async_trait]
impl VerificationSource for OrcidSource {
    fn name(&self) -> &'static str {
        "ORCID"
    }

    async fn verify(&self, researcher: &Researcher) -> SourceResult<Vec<UnifiedWork>> {
        if !check_queryable_name(self.name(), researcher) {
            return Ok(Vec::new());
        }

        let matcher = NameMatcher::new(researcher.uncertain_name_order);

        let given = researcher.given_name_or_empty().to_string();
        let surname = researcher.surname_or_empty().to_string();

        // Under uncertain name order query both orderings; the registry's
        // field search is order-sensitive even though our matcher is not.
        let mut name_variations = vec![(given.clone(), surname.clone())];
        if researcher.uncertain_name_order {
            name_variations.push((surname, given));
        }

        let mut works = Vec::new();
        // The OR-joined queries for the two orderings overlap, so the same
        // registry record can come back from both. Keep each ORCID iD once.
        let mut seen_ids: BTreeSet<String> = BTreeSet::new();

        for (given_name, surname) in &name_variations {
            let params = vec![
                ("q".to_string(), Self::build_query(researcher, given_name, surname)),
                ("start".to_string(), "0".to_string()),
                ("rows".to_string(), self.rows.to_string()),
            ];

            let value = self.client.get_json(&self.base_url, &params).await?;

            let Some(records) = value.get("expanded-result").and_then(Value::as_array) else {
                continue;
            };

            for record in records {
                if let Some(id) = record.get("orcid-id").and_then(Value::as_str) {
                    if !seen_ids.insert(id.to_string()) {
                        continue;
                    }
                }
                if let Some(work) = self.parse_record(record, researcher, &matcher) {
                    works.push(work);
                }
            }
        }

        tracing::info!(count = works.len(), "obtained researcher info from ORCID");
        Ok(works)
    }
}
