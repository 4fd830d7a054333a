//! Unified work records - one retrieved publication, already matched to a
//! candidate author by its source.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::RankingConfig;
use crate::models::{Author, Researcher};
use crate::rank::{Mergeable, RankBreakdown, Rankable, merge_scalar};

/// Separator between concatenated raw payloads of merged records.
const RAW_DATA_SEPARATOR: &str = "\n--------------------\n";

/// A single work retrieved from a verification source, in source-neutral form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnifiedWork {
    /// The author of this work that matched the target researcher.
    pub matched_author: Option<Author>,

    /// The work's other authors.
    pub co_authors: BTreeSet<Author>,

    /// Digital Object Identifier; the intra-author dedup key.
    pub doi: Option<String>,

    /// Known URLs for the work.
    pub urls: BTreeSet<String>,

    /// Work title.
    pub title: Option<String>,

    /// Diverging titles seen in other sources.
    pub title_alternatives: BTreeSet<String>,

    /// Publishers / venues.
    pub publishers: BTreeSet<String>,

    /// Subject domains.
    pub domains: BTreeSet<String>,

    /// Opaque source payload, concatenated across merges for audit purposes.
    pub raw_data: String,

    /// Name of the source this record came from.
    pub data_source: String,

    internal_rank: f64,
    rank_breakdown: RankBreakdown,
}

impl UnifiedWork {
    /// Create an empty record tagged with its data source.
    #[must_use]
    pub fn from_source(data_source: impl Into<String>) -> Self {
        Self { data_source: data_source.into(), ..Self::default() }
    }

    /// Dedup key within an author bucket. Works without a DOI share the
    /// single `None` slot - a documented coarse behavior.
    #[must_use]
    pub fn doi_key(&self) -> Option<String> {
        self.doi.clone().filter(|d| !d.is_empty())
    }

    /// Breakdown from the last rank calculation.
    #[must_use]
    pub const fn rank_breakdown(&self) -> &RankBreakdown {
        &self.rank_breakdown
    }
}

impl Mergeable for UnifiedWork {
    fn merge_with(&mut self, other: Self) {
        match (self.matched_author.as_mut(), other.matched_author) {
            (Some(ours), Some(theirs)) => ours.merge_with(theirs),
            (None, Some(theirs)) => self.matched_author = Some(theirs),
            _ => {}
        }

        self.co_authors.extend(other.co_authors);

        if self.doi.is_none() {
            self.doi = other.doi;
        }

        self.urls.extend(other.urls);

        merge_scalar(&mut self.title, &mut self.title_alternatives, other.title);
        self.title_alternatives.extend(other.title_alternatives);

        self.publishers.extend(other.publishers);
        self.domains.extend(other.domains);

        self.raw_data.push_str(&format!(
            "{RAW_DATA_SEPARATOR}SOURCE: ({}) -> {}",
            other.data_source, other.raw_data
        ));
    }
}

impl Rankable for UnifiedWork {
    fn calculate_internal_rank(
        &mut self,
        researcher: &Researcher,
        cfg: &RankingConfig,
    ) -> RankBreakdown {
        let mut breakdown = RankBreakdown::default();

        if let Some(author) = self.matched_author.as_mut() {
            let author_breakdown = author.calculate_internal_rank(researcher, cfg);
            breakdown.absorb("matched_author", &author_breakdown, cfg.matched_author_weight);
        }

        if !self.co_authors.is_empty() {
            let coauthor_total: f64 = self
                .co_authors
                .iter()
                .map(|author| author.compute_rank(researcher, cfg).total)
                .sum();
            breakdown.push("co_authors", coauthor_total * cfg.coauthor_weight, false);
        }

        if self.doi.is_some() {
            breakdown.push("doi", cfg.doi_value, false);
        }

        if !self.urls.is_empty() {
            breakdown.push("urls", self.urls.len() as f64 * cfg.url_value, false);
        }

        if self.title.is_some() {
            breakdown.push("title", cfg.title_value, false);
        }

        if !self.title_alternatives.is_empty() {
            breakdown.push(
                "title_alternatives",
                self.title_alternatives.len() as f64 * cfg.title_alternative_value,
                false,
            );
        }

        if !self.publishers.is_empty() {
            breakdown.push("publishers", self.publishers.len() as f64 * cfg.publisher_value, false);
        }

        if !self.domains.is_empty() {
            breakdown.push("domains", self.domains.len() as f64 * cfg.domain_value, false);
        }

        self.internal_rank = breakdown.total;
        self.rank_breakdown = breakdown.clone();
        breakdown
    }

    fn internal_rank(&self) -> f64 {
        self.internal_rank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched_work(source: &str, doi: &str, url: &str) -> UnifiedWork {
        let mut author = Author::new(Some("Jane".to_string()), Some("Doe".to_string()));
        author.name_match_ratio = 200.0;

        let mut work = UnifiedWork::from_source(source);
        work.matched_author = Some(author);
        work.doi = Some(doi.to_string());
        work.urls.insert(url.to_string());
        work.raw_data = format!("payload from {source}");
        work
    }

    #[test]
    fn test_merge_unions_urls() {
        let mut a = matched_work("crossref", "10.1/x", "u1");
        let b = matched_work("orcid", "10.1/x", "u2");

        a.merge_with(b);
        assert_eq!(a.urls.len(), 2);
        assert!(a.urls.contains("u1") && a.urls.contains("u2"));
    }

    #[test]
    fn test_merge_title_divergence() {
        let mut a = matched_work("crossref", "10.1/x", "u1");
        a.title = Some("A Title".to_string());
        let mut b = matched_work("eosc", "10.1/x", "u2");
        b.title = Some("A Title, Revisited".to_string());

        a.merge_with(b);
        assert_eq!(a.title.as_deref(), Some("A Title"));
        assert!(a.title_alternatives.contains("A Title, Revisited"));
    }

    #[test]
    fn test_merge_concatenates_raw_payloads() {
        let mut a = matched_work("crossref", "10.1/x", "u1");
        let b = matched_work("eosc", "10.1/x", "u2");

        a.merge_with(b);
        assert!(a.raw_data.starts_with("payload from crossref"));
        assert!(a.raw_data.contains("SOURCE: (eosc) -> payload from eosc"));
    }

    #[test]
    fn test_rank_formula() {
        let researcher = Researcher::new("Jane", "Doe");
        let cfg = RankingConfig::default();

        let mut work = matched_work("crossref", "10.1/x", "u1");
        work.title = Some("A Title".to_string());
        work.publishers.insert("Pub".to_string());
        work.domains.insert("physics".to_string());

        let breakdown = work.calculate_internal_rank(&researcher, &cfg);

        let expected = cfg.matched_author_weight * 200.0 // matched author's name ratio
            + cfg.doi_value
            + cfg.url_value
            + cfg.title_value
            + cfg.publisher_value
            + cfg.domain_value;
        assert_eq!(breakdown.total, expected);
        assert_eq!(work.internal_rank(), expected);
    }

    #[test]
    fn test_coauthors_are_weighted() {
        let researcher = Researcher::new("Jane", "Doe");
        let cfg = RankingConfig::default();

        let mut coauthor = Author::new(Some("Alex".to_string()), Some("Roe".to_string()));
        coauthor.name_match_ratio = 100.0;

        let mut work = UnifiedWork::from_source("crossref");
        work.co_authors.insert(coauthor);

        let breakdown = work.calculate_internal_rank(&researcher, &cfg);
        assert_eq!(breakdown.total, 100.0 * cfg.coauthor_weight);
    }

    #[test]
    fn test_doi_key_treats_empty_as_missing() {
        let mut work = UnifiedWork::from_source("eosc");
        assert_eq!(work.doi_key(), None);

        work.doi = Some(String::new());
        assert_eq!(work.doi_key(), None);

        work.doi = Some("10.1/x".to_string());
        assert_eq!(work.doi_key(), Some("10.1/x".to_string()));
    }
}
