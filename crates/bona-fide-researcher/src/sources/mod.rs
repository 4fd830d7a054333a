//! Verification source adapters.
//!
//! Each adapter queries one external bibliographic/registry API, filters the
//! retrieved records by name-match score against the target researcher and
//! hands back source-neutral [`UnifiedWork`] records for aggregation.

mod client;
mod crossref;
mod eosc;
mod orcid;

pub use client::SourceClient;
pub use crossref::CrossrefSource;
pub use eosc::EoscSource;
pub use orcid::OrcidSource;

use crate::error::SourceResult;
use crate::models::{Researcher, UnifiedWork};

/// One external source of researcher evidence.
#[async_trait::async_trait]
pub trait VerificationSource: Send + Sync {
    /// Short source name used in diagnostics and data-source tags.
    fn name(&self) -> &'static str;

    /// Query the source and return name-filtered unified results.
    ///
    /// Sources skip themselves (returning an empty list, with a diagnostic)
    /// when the researcher is missing the name parts they need.
    async fn verify(&self, researcher: &Researcher) -> SourceResult<Vec<UnifiedWork>>;
}

/// Split a full name into (given name, surname), taking the first and last
/// whitespace-separated tokens and stripping trailing punctuation.
#[must_use]
pub(crate) fn split_full_name(full_name: &str) -> Option<(String, String)> {
    let parts: Vec<String> = full_name
        .split_whitespace()
        .map(|part| part.trim_matches(|c| c == ',' || c == ';').to_string())
        .filter(|part| !part.is_empty())
        .collect();

    if parts.len() < 2 {
        return None;
    }

    Some((parts[0].clone(), parts[parts.len() - 1].clone()))
}

/// Derive a host domain from a work URL, if it parses.
#[must_use]
pub(crate) fn domain_of(url_str: &str) -> Option<String> {
    url::Url::parse(url_str).ok()?.host_str().map(str::to_string)
}

/// Log and short-circuit when the researcher has no usable name.
pub(crate) fn check_queryable_name(source: &'static str, researcher: &Researcher) -> bool {
    if researcher.has_full_name() {
        true
    } else {
        tracing::warn!(source, "missing researcher given name or surname, skipping source");
        false
    }
}
