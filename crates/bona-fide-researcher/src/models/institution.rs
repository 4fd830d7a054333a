//! Institutions attached to candidate authors.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::matching::fuzzy_ratio;
use crate::models::Researcher;
use crate::rank::RankBreakdown;

/// Identity key with the precedence ROR > ISNI > name.
///
/// Identity-defining fields are captured once into the key; equality, ordering
/// and hashing of [`Institution`] all delegate to it so hash-keyed structures
/// stay consistent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstitutionKey {
    /// Research Organization Registry id.
    Ror(String),
    /// International Standard Name Identifier.
    Isni(String),
    /// Plain name, when no identifier is known.
    Name(String),
}

/// An organization a candidate author is affiliated with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    /// Institution name (may be empty when only an identifier is known).
    pub name: String,

    /// Research Organization Registry id.
    #[serde(default)]
    pub ror: Option<String>,

    /// International Standard Name Identifier.
    #[serde(default)]
    pub isni: Option<String>,
}

impl Institution {
    /// Create an institution from its name alone.
    #[must_use]
    pub fn from_name(name: impl Into<String>) -> Self {
        Self { name: name.into(), ror: None, isni: None }
    }

    /// Create an institution with optional identifiers.
    #[must_use]
    pub fn new(name: impl Into<String>, ror: Option<String>, isni: Option<String>) -> Self {
        Self { name: name.into(), ror, isni }
    }

    /// Identity key, by the ROR > ISNI > name precedence.
    #[must_use]
    pub fn identity_key(&self) -> InstitutionKey {
        if let Some(ror) = &self.ror {
            if !ror.is_empty() {
                return InstitutionKey::Ror(ror.clone());
            }
        }
        if let Some(isni) = &self.isni {
            if !isni.is_empty() {
                return InstitutionKey::Isni(isni.clone());
            }
        }
        InstitutionKey::Name(self.name.clone())
    }

    /// Score this institution against the target researcher's affiliation.
    ///
    /// Identifier presence earns a small base credit and an exact match
    /// against the target affiliation a large one. The name contributes the
    /// *maximum* of a small presence credit and the scaled fuzzy similarity
    /// to the affiliation string, never their sum.
    #[must_use]
    pub fn calculate_rank(&self, researcher: &Researcher, cfg: &RankingConfig) -> RankBreakdown {
        let mut breakdown = RankBreakdown::default();
        let affiliation = researcher.affiliation.as_deref();

        if let Some(ror) = self.ror.as_deref().filter(|r| !r.is_empty()) {
            let perfect = affiliation == Some(ror);
            let mut score = cfg.identifier_presence_value;
            if perfect {
                score += cfg.affiliation_exact_match_value;
            }
            breakdown.push("ror", score, perfect);
        }

        if let Some(isni) = self.isni.as_deref().filter(|i| !i.is_empty()) {
            let perfect = affiliation == Some(isni);
            let mut score = cfg.identifier_presence_value;
            if perfect {
                score += cfg.affiliation_exact_match_value;
            }
            breakdown.push("isni", score, perfect);
        }

        if !self.name.is_empty() {
            let similarity = affiliation.map_or(0.0, |a| fuzzy_ratio(&self.name, a));
            let scaled = similarity / 100.0 * cfg.institution_name_similarity_weight;
            let perfect = affiliation == Some(self.name.as_str());
            breakdown.push("name", cfg.institution_name_presence_value.max(scaled), perfect);
        }

        breakdown
    }
}

impl PartialEq for Institution {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for Institution {}

impl PartialOrd for Institution {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Institution {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity_key().cmp(&other.identity_key())
    }
}

impl Hash for Institution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_with_affiliation(affiliation: &str) -> Researcher {
        Researcher {
            affiliation: Some(affiliation.to_string()),
            ..Researcher::new("Jane", "Doe")
        }
    }

    #[test]
    fn test_identity_precedence() {
        let ror = Institution::new("A", Some("ror:1".into()), Some("isni:1".into()));
        assert_eq!(ror.identity_key(), InstitutionKey::Ror("ror:1".into()));

        let isni = Institution::new("A", None, Some("isni:1".into()));
        assert_eq!(isni.identity_key(), InstitutionKey::Isni("isni:1".into()));

        let name = Institution::from_name("A");
        assert_eq!(name.identity_key(), InstitutionKey::Name("A".into()));
    }

    #[test]
    fn test_equal_ror_means_equal_institution() {
        let a = Institution::new("CERN", Some("ror:x".into()), None);
        let b = Institution::new("European Org. for Nuclear Research", Some("ror:x".into()), None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ror_exact_match_earns_large_credit() {
        let institution = Institution::new("CERN", Some("ror:x".into()), None);
        let cfg = RankingConfig::default();

        let matched = institution.calculate_rank(&target_with_affiliation("ror:x"), &cfg);
        let unmatched = institution.calculate_rank(&target_with_affiliation("ror:y"), &cfg);

        assert!(matched.total > unmatched.total);
        assert_eq!(matched.perfect_matches, 1);
        assert_eq!(unmatched.perfect_matches, 0);
    }

    #[test]
    fn test_name_component_is_max_not_sum() {
        let institution = Institution::from_name("CERN");
        let cfg = RankingConfig::default();

        // Identical name: similarity 100 -> scaled weight, presence credit not added on top.
        let breakdown = institution.calculate_rank(&target_with_affiliation("CERN"), &cfg);
        let name_component =
            breakdown.components.iter().find(|c| c.attribute == "name").unwrap();
        assert_eq!(name_component.score, cfg.institution_name_similarity_weight);

        // Dissimilar name: floor at the presence credit.
        let breakdown = institution.calculate_rank(&target_with_affiliation("zzzzzzzz"), &cfg);
        let name_component =
            breakdown.components.iter().find(|c| c.attribute == "name").unwrap();
        assert!(name_component.score >= cfg.institution_name_presence_value);
    }

    #[test]
    fn test_no_affiliation_is_baseline_not_error() {
        let institution = Institution::new("CERN", Some("ror:x".into()), None);
        let cfg = RankingConfig::default();
        let breakdown = institution.calculate_rank(&Researcher::new("Jane", "Doe"), &cfg);

        assert!(breakdown.total > 0.0);
        assert_eq!(breakdown.perfect_matches, 0);
    }
}
