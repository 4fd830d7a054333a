//! JSON report formatting.

use serde_json::{Value, json};

use crate::aggregator::{AuthorSummary, WorkSummary};
use crate::models::Researcher;

/// Build the serializable report structure for API responses.
#[must_use]
pub fn compact_report(researcher: &Researcher, summaries: &[AuthorSummary]) -> Value {
    json!({
        "researcher": {
            "given_name": researcher.given_name,
            "surname": researcher.surname,
            "orcid": researcher.orcid,
            "uncertain_name_order": researcher.uncertain_name_order,
        },
        "candidates": summaries.iter().map(compact_author).collect::<Vec<_>>(),
    })
}

/// Compact representation of one ranked author candidate.
#[must_use]
pub fn compact_author(summary: &AuthorSummary) -> Value {
    let mut obj = json!({
        "given_name": summary.given_name,
        "surname": summary.surname,
        "name_match_ratio": summary.name_match_ratio,
        "rank": summary.internal_rank,
        "perfect_matches": summary.perfect_match_count,
        "rank_breakdown": summary.rank_breakdown,
        "works": summary.works.iter().map(compact_work).collect::<Vec<_>>(),
    });

    // Optional fields only when present
    if let Some(orcid) = &summary.orcid {
        obj["orcid"] = json!(orcid);
    }

    if !summary.orcid_alternatives.is_empty() {
        obj["orcid_alternatives"] = json!(summary.orcid_alternatives);
    }

    if !summary.emails.is_empty() {
        obj["emails"] = json!(summary.emails);
    }

    if !summary.institutions.is_empty() {
        obj["institutions"] = json!(summary.institutions);
    }

    obj
}

/// Compact representation of one work.
#[must_use]
pub fn compact_work(work: &WorkSummary) -> Value {
    let mut obj = json!({
        "doi": work.doi,
        "title": work.title,
        "urls": work.urls,
        "source": work.data_source,
        "rank": work.internal_rank,
    });

    if !work.title_alternatives.is_empty() {
        obj["title_alternatives"] = json!(work.title_alternatives);
    }

    if !work.publishers.is_empty() {
        obj["publishers"] = json!(work.publishers);
    }

    if !work.domains.is_empty() {
        obj["domains"] = json!(work.domains);
    }

    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ResultsAggregator;
    use crate::config::RankingConfig;
    use crate::models::{Author, UnifiedWork};

    #[test]
    fn test_compact_report_shape() {
        let researcher = Researcher::new("Jane", "Doe");
        let mut aggregator = ResultsAggregator::new(researcher.clone(), RankingConfig::default());

        let mut author = Author::new(Some("Jane".to_string()), Some("Doe".to_string()));
        author.orcid = Some("0000-1111-2222-3333".to_string());
        author.name_match_ratio = 200.0;

        let mut work = UnifiedWork::from_source("crossref");
        work.matched_author = Some(author);
        work.doi = Some("10.1/x".to_string());
        work.urls.insert("u1".to_string());

        aggregator.add(vec![work]);
        aggregator.rank();
        aggregator.sort();

        let report = compact_report(&researcher, &aggregator.summaries(None));

        assert_eq!(report["researcher"]["given_name"], "Jane");
        assert_eq!(report["candidates"][0]["orcid"], "0000-1111-2222-3333");
        assert_eq!(report["candidates"][0]["works"][0]["doi"], "10.1/x");
        assert_eq!(report["candidates"][0]["works"][0]["urls"][0], "u1");
        assert!(report["candidates"][0]["rank_breakdown"]["total"].is_number());
    }
}
