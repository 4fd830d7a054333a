//! Candidate authors matched against the target researcher.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::config::{RankingConfig, ranking};
use crate::models::{Institution, Researcher};
use crate::rank::{Mergeable, RankBreakdown, Rankable, merge_scalar};

/// Identity key for an author: ORCID when present, otherwise the name pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AuthorKey {
    /// Persistent researcher identifier.
    Orcid(String),
    /// Name pair fallback.
    Name {
        /// Given name (empty string when unknown).
        given_name: String,
        /// Surname (empty string when unknown).
        surname: String,
    },
}

/// One candidate author assembled from a source record.
///
/// Created once per distinct source record; instances describing the same
/// real person resolve into one aggregator bucket through [`AuthorKey`]
/// equality, and their information is consolidated via [`Mergeable`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct Author {
    /// Given name.
    pub given_name: Option<String>,

    /// Diverging given names seen in other sources.
    pub given_name_alternatives: BTreeSet<String>,

    /// Surname.
    pub surname: Option<String>,

    /// Diverging surnames seen in other sources.
    pub surname_alternatives: BTreeSet<String>,

    /// Known institutional affiliations.
    pub institutions: BTreeSet<Institution>,

    /// Known email addresses.
    pub emails: BTreeSet<String>,

    /// ORCID identifier.
    pub orcid: Option<String>,

    /// Conflicting ORCID values seen in other sources.
    pub orcid_alternatives: BTreeSet<String>,

    /// Name-match score against the target researcher (0-200).
    pub name_match_ratio: f64,

    internal_rank: f64,
    perfect_match_count: u32,
    rank_breakdown: RankBreakdown,
}

impl Author {
    /// Create an author from the name pair.
    #[must_use]
    pub fn new(given_name: Option<String>, surname: Option<String>) -> Self {
        Self { given_name, surname, ..Self::default() }
    }

    /// Identity key: ORCID when present, otherwise the name pair.
    #[must_use]
    pub fn identity_key(&self) -> AuthorKey {
        match self.orcid.as_deref() {
            Some(orcid) if !orcid.is_empty() => AuthorKey::Orcid(orcid.to_string()),
            _ => AuthorKey::Name {
                given_name: self.given_name.clone().unwrap_or_default(),
                surname: self.surname.clone().unwrap_or_default(),
            },
        }
    }

    /// Number of attributes that exactly matched the target researcher,
    /// as of the last rank calculation.
    #[must_use]
    pub const fn perfect_match_count(&self) -> u32 {
        self.perfect_match_count
    }

    /// Breakdown from the last rank calculation.
    #[must_use]
    pub const fn rank_breakdown(&self) -> &RankBreakdown {
        &self.rank_breakdown
    }

    /// Score this author against the target researcher without storing the
    /// result (used for co-authors held in shared sets).
    #[must_use]
    pub fn compute_rank(&self, researcher: &Researcher, cfg: &RankingConfig) -> RankBreakdown {
        let mut breakdown = RankBreakdown::default();

        let name_perfect = self.name_match_ratio >= ranking::PERFECT_NAME_MATCH_RATIO
            || (self.given_name.is_some()
                && self.given_name == researcher.given_name
                && self.surname == researcher.surname);
        breakdown.push("name", self.name_match_ratio, name_perfect);

        if let Some(orcid) = self.orcid.as_deref().filter(|o| !o.is_empty()) {
            let perfect = researcher.orcid.as_deref() == Some(orcid);
            let mut score = cfg.orcid_presence_value;
            if perfect {
                score += cfg.orcid_exact_match_value;
            }
            breakdown.push("orcid", score, perfect);
        }

        if let Some(email) = researcher.email.as_deref() {
            if self.emails.contains(email) {
                breakdown.push("email", cfg.email_exact_match_value, true);
            }
        }

        if !self.institutions.is_empty() {
            let mut institutions_breakdown = RankBreakdown::default();
            for institution in &self.institutions {
                let inner = institution.calculate_rank(researcher, cfg);
                institutions_breakdown.total += inner.total;
                institutions_breakdown.perfect_matches += inner.perfect_matches;
            }
            breakdown.absorb("institutions", &institutions_breakdown, 1.0);
        }

        breakdown
    }
}

impl Rankable for Author {
    fn calculate_internal_rank(
        &mut self,
        researcher: &Researcher,
        cfg: &RankingConfig,
    ) -> RankBreakdown {
        let breakdown = self.compute_rank(researcher, cfg);
        self.internal_rank = breakdown.total;
        self.perfect_match_count = breakdown.perfect_matches;
        self.rank_breakdown = breakdown.clone();
        breakdown
    }

    fn internal_rank(&self) -> f64 {
        self.internal_rank
    }
}

impl Mergeable for Author {
    fn merge_with(&mut self, other: Self) {
        merge_scalar(&mut self.given_name, &mut self.given_name_alternatives, other.given_name);
        self.given_name_alternatives.extend(other.given_name_alternatives);

        merge_scalar(&mut self.surname, &mut self.surname_alternatives, other.surname);
        self.surname_alternatives.extend(other.surname_alternatives);

        if let (Some(ours), Some(theirs)) = (self.orcid.as_deref(), other.orcid.as_deref()) {
            if ours != theirs {
                tracing::warn!(
                    current = ours,
                    incoming = theirs,
                    "conflicting ORCID values for one resolved author"
                );
            }
        }
        merge_scalar(&mut self.orcid, &mut self.orcid_alternatives, other.orcid);
        self.orcid_alternatives.extend(other.orcid_alternatives);

        self.institutions.extend(other.institutions);
        self.emails.extend(other.emails);

        self.name_match_ratio = self.name_match_ratio.max(other.name_match_ratio);
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for Author {}

impl PartialOrd for Author {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Author {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity_key().cmp(&other.identity_key())
    }
}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}
