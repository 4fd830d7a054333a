//! Shared rank and merge contracts for identity and result records.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::RankingConfig;
use crate::models::Researcher;

/// A record that can score itself against the target researcher.
pub trait Rankable {
    /// Compute and store the internal rank, returning a fresh breakdown.
    ///
    /// Each call produces a new immutable [`RankBreakdown`]; breakdowns from
    /// earlier calls are never mutated.
    fn calculate_internal_rank(
        &mut self,
        researcher: &Researcher,
        cfg: &RankingConfig,
    ) -> RankBreakdown;

    /// The most recently calculated internal rank.
    fn internal_rank(&self) -> f64;
}

/// A record that can absorb another instance of itself.
///
/// Merging is a monotonic union: set-valued fields are unioned and scalar
/// fields follow "fill absent, else diverge to alternatives". No information
/// is ever dropped, and repeated merges in any arrival order yield the same
/// set of known values (only the primary-vs-alternative slot of a scalar
/// depends on which source arrived first - an accepted asymmetry).
pub trait Mergeable {
    /// Merge `other` into `self`.
    fn merge_with(&mut self, other: Self);
}

/// One attribute's contribution to a rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankComponent {
    /// Attribute name (e.g. "orcid", "institutions").
    pub attribute: &'static str,

    /// Score contributed by this attribute.
    pub score: f64,

    /// Whether the attribute exactly matched the target researcher.
    pub perfect: bool,
}

/// Explainable, per-attribute rank breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankBreakdown {
    /// Sum of all component scores.
    pub total: f64,

    /// Number of attributes that achieved a perfect match.
    pub perfect_matches: u32,

    /// Per-attribute contributions, in scoring order.
    pub components: Vec<RankComponent>,
}

impl RankBreakdown {
    /// Add one attribute contribution.
    pub fn push(&mut self, attribute: &'static str, score: f64, perfect: bool) {
        self.total += score;
        if perfect {
            self.perfect_matches += 1;
        }
        self.components.push(RankComponent { attribute, score, perfect });
    }

    /// Fold another breakdown in as a single weighted component, carrying its
    /// perfect-match count.
    pub fn absorb(&mut self, attribute: &'static str, other: &Self, weight: f64) {
        let score = other.total * weight;
        self.total += score;
        self.perfect_matches += other.perfect_matches;
        self.components.push(RankComponent {
            attribute,
            score,
            perfect: other.perfect_matches > 0,
        });
    }
}

/// Merge a scalar field per the merge contract: adopt `incoming` when the
/// primary slot is empty, otherwise record a diverging value as an
/// alternative. The primary value is never overwritten once set.
pub fn merge_scalar(
    primary: &mut Option<String>,
    alternatives: &mut BTreeSet<String>,
    incoming: Option<String>,
) {
    let Some(incoming) = incoming else { return };
    if incoming.is_empty() {
        return;
    }

    match primary {
        None => *primary = Some(incoming),
        Some(current) if *current != incoming => {
            alternatives.insert(incoming);
        }
        Some(_) => {}
    }
}
