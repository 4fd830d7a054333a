//! Human-readable report rendering.

use crate::aggregator::{AuthorSummary, WorkSummary};
use crate::models::Researcher;

/// Format a full verification report as plain text.
#[must_use]
pub fn format_report_text(researcher: &Researcher, summaries: &[AuthorSummary]) -> String {
    let mut output = format!(
        "Verification report for {} {}\n",
        researcher.given_name_or_empty(),
        researcher.surname_or_empty()
    );

    if summaries.is_empty() {
        output.push_str("No matching researcher identities found.\n");
        return output;
    }

    for (i, summary) in summaries.iter().enumerate() {
        output.push_str("########################################\n");
        output.push_str(&format_author_text(summary, i + 1));

        for work in &summary.works {
            output.push_str("----------------------------------------\n");
            output.push_str(&format_work_text(work));
        }
    }

    output
}

/// Format one ranked author candidate.
#[must_use]
pub fn format_author_text(summary: &AuthorSummary, index: usize) -> String {
    let mut output = format!(
        "{}. {} {} [rank: {:.2}, perfect matches: {}]\n",
        index,
        summary.given_name.as_deref().unwrap_or("?"),
        summary.surname.as_deref().unwrap_or("?"),
        summary.internal_rank,
        summary.perfect_match_count,
    );

    output.push_str(&format!("ORCID: {}\n", summary.orcid.as_deref().unwrap_or("?")));
    if !summary.orcid_alternatives.is_empty() {
        output.push_str(&format!(
            "Conflicting ORCID values: {}\n",
            summary.orcid_alternatives.join(", ")
        ));
    }

    if !summary.emails.is_empty() {
        output.push_str(&format!("Emails: {}\n", summary.emails.join(", ")));
    }

    if summary.institutions.is_empty() {
        output.push_str("Institutions: ?\n");
    } else {
        output.push_str("Institutions:\n");
        for institution in &summary.institutions {
            output.push_str(&format!(
                "\t- {} (ROR: {}, ISNI: {})\n",
                if institution.name.is_empty() { "?" } else { &institution.name },
                institution.ror.as_deref().unwrap_or("?"),
                institution.isni.as_deref().unwrap_or("?"),
            ));
        }
    }

    output.push_str(&format!("Name match: {:.0}/200\n", summary.name_match_ratio));
    output.push_str("Rank breakdown:\n");
    for component in &summary.rank_breakdown.components {
        output.push_str(&format!(
            "\t- {}: {:.2}{}\n",
            component.attribute,
            component.score,
            if component.perfect { " (perfect match)" } else { "" }
        ));
    }

    output
}

/// Format one work within an author's bucket.
#[must_use]
pub fn format_work_text(work: &WorkSummary) -> String {
    let mut output = format!("Title: {}\n", work.title.as_deref().unwrap_or("?"));
    output.push_str(&format!("DOI: {}\n", work.doi.as_deref().unwrap_or("?")));
    output.push_str(&format!("Source: {} [rank: {:.2}]\n", work.data_source, work.internal_rank));

    if work.urls.is_empty() {
        output.push_str("URLs: ?\n");
    } else {
        output.push_str("URLs:\n");
        for url in &work.urls {
            output.push_str(&format!("\t- {url}\n"));
        }
    }

    if !work.title_alternatives.is_empty() {
        output.push_str("Alternative titles:\n");
        for title in &work.title_alternatives {
            output.push_str(&format!("\t- {title}\n"));
        }
    }

    if work.publishers.is_empty() {
        output.push_str("Publishers: ?\n");
    } else {
        output.push_str("Publishers:\n");
        for publisher in &work.publishers {
            output.push_str(&format!("\t- {publisher}\n"));
        }
    }

    if work.domains.is_empty() {
        output.push_str("Domains: ?\n");
    } else {
        output.push_str("Domains:\n");
        for domain in &work.domains {
            output.push_str(&format!("\t- {domain}\n"));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ResultsAggregator;
    use crate::config::RankingConfig;
    use crate::models::{Author, UnifiedWork};

    #[test]
    fn test_format_empty_report() {
        let researcher = Researcher::new("Jane", "Doe");
        let text = format_report_text(&researcher, &[]);
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("No matching researcher identities"));
    }

    #[test]
    fn test_format_report_lists_works() {
        let researcher = Researcher::new("Jane", "Doe");
        let mut aggregator = ResultsAggregator::new(researcher.clone(), RankingConfig::default());

        let mut author = Author::new(Some("Jane".to_string()), Some("Doe".to_string()));
        author.name_match_ratio = 200.0;
        let mut work = UnifiedWork::from_source("crossref");
        work.matched_author = Some(author);
        work.doi = Some("10.1/x".to_string());
        work.title = Some("A Title".to_string());
        work.urls.insert("https://example.org/x".to_string());

        aggregator.add(vec![work]);
        aggregator.rank();
        aggregator.sort();

        let text = format_report_text(&researcher, &aggregator.summaries(None));
        assert!(text.contains("1. Jane Doe"));
        assert!(text.contains("DOI: 10.1/x"));
        assert!(text.contains("A Title"));
        assert!(text.contains("https://example.org/x"));
        assert!(text.contains("Rank breakdown"));
    }
}
