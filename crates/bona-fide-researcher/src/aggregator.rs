//! Cross-source entity resolution and ranking.
//!
//! Incoming unified works are grouped into buckets keyed by resolved author
//! identity, deduplicated by DOI within each bucket, merged, ranked and
//! sorted. The pipeline is build -> rank -> sort -> present; rank and sort
//! are idempotent and presentation never mutates state.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use crate::config::RankingConfig;
use crate::models::{Author, AuthorKey, Institution, Researcher, UnifiedWork};
use crate::rank::{Mergeable, RankBreakdown, Rankable};

/// One resolved author identity with its deduplicated works.
#[derive(Debug, Clone)]
pub struct AuthorBucket {
    /// Canonical author, consolidating every source's matched author.
    author: Author,

    /// Works keyed by DOI (`None` collects all DOI-less works).
    works: BTreeMap<Option<String>, UnifiedWork>,

    /// Bucket total from the last `rank` call.
    internal_rank: f64,

    /// Work keys in presentation order, set by `sort`.
    work_order: Vec<Option<String>>,
}

impl AuthorBucket {
    fn new(author: Author) -> Self {
        Self { author, works: BTreeMap::new(), internal_rank: 0.0, work_order: Vec::new() }
    }

    /// The bucket's canonical author.
    #[must_use]
    pub const fn author(&self) -> &Author {
        &self.author
    }

    /// Number of deduplicated works in this bucket.
    #[must_use]
    pub fn work_count(&self) -> usize {
        self.works.len()
    }

    /// Bucket total from the last rank pass.
    #[must_use]
    pub const fn internal_rank(&self) -> f64 {
        self.internal_rank
    }

    /// Works in presentation order (requires a prior `sort`).
    pub fn works_sorted(&self) -> impl Iterator<Item = &UnifiedWork> {
        self.work_order.iter().filter_map(|key| self.works.get(key))
    }
}

/// Groups per-source results by author identity, merges duplicates and
/// produces a sorted, presentable ranking.
#[derive(Debug, Clone)]
pub struct ResultsAggregator {
    researcher: Researcher,
    cfg: RankingConfig,
    buckets: BTreeMap<AuthorKey, AuthorBucket>,
    order: Vec<AuthorKey>,
}

impl ResultsAggregator {
    /// Create an aggregator for one verification run.
    #[must_use]
    pub fn new(researcher: Researcher, cfg: RankingConfig) -> Self {
        Self { researcher, cfg, buckets: BTreeMap::new(), order: Vec::new() }
    }

    /// The researcher this aggregation is scoped to.
    #[must_use]
    pub const fn researcher(&self) -> &Researcher {
        &self.researcher
    }

    /// Add a batch of per-source results.
    ///
    /// Each work resolves independently: a work without a matched author is
    /// dropped with a diagnostic and never aborts the rest of the batch. Two
    /// works whose matched authors are equal land in the same bucket even
    /// when they are different instances from different sources; within a
    /// bucket, works sharing a DOI are merged.
    pub fn add(&mut self, results: Vec<UnifiedWork>) {
        for work in results {
            let Some(author) = work.matched_author.clone() else {
                tracing::warn!(
                    source = %work.data_source,
                    doi = work.doi.as_deref().unwrap_or("?"),
                    "dropping work without a matched author"
                );
                continue;
            };

            let bucket = match self.buckets.entry(author.identity_key()) {
                Entry::Occupied(entry) => {
                    let bucket = entry.into_mut();
                    bucket.author.merge_with(author);
                    bucket
                }
                Entry::Vacant(entry) => entry.insert(AuthorBucket::new(author)),
            };

            match bucket.works.entry(work.doi_key()) {
                Entry::Occupied(entry) => entry.into_mut().merge_with(work),
                Entry::Vacant(entry) => {
                    entry.insert(work);
                }
            }
        }
    }

    /// Compute every bucket's rank.
    ///
    /// A bucket's total is the sum of its works' ranks, plus the canonical
    /// author's own rank when `bucket_includes_author_rank` is set. The
    /// author contribution is then counted twice - once here and once inside
    /// each work's weighted matched-author component - which is the reference
    /// behavior, kept switchable rather than silently corrected.
    pub fn rank(&mut self) {
        for bucket in self.buckets.values_mut() {
            let author_breakdown =
                bucket.author.calculate_internal_rank(&self.researcher, &self.cfg);

            let works_total: f64 = bucket
                .works
                .values_mut()
                .map(|work| work.calculate_internal_rank(&self.researcher, &self.cfg).total)
                .sum();

            bucket.internal_rank = if self.cfg.bucket_includes_author_rank {
                works_total + author_breakdown.total
            } else {
                works_total
            };
        }
    }

    /// Order buckets and their works for presentation.
    ///
    /// Buckets sort descending by `(perfect_match_count, internal_rank)`,
    /// with the author key as a stable final tie-break; works within a
    /// bucket sort descending by rank, tie-broken on the DOI key.
    pub fn sort(&mut self) {
        let mut keys: Vec<AuthorKey> = self.buckets.keys().cloned().collect();
        keys.sort_by(|a, b| {
            let bucket_a = &self.buckets[a];
            let bucket_b = &self.buckets[b];
            bucket_b
                .author
                .perfect_match_count()
                .cmp(&bucket_a.author.perfect_match_count())
                .then_with(|| {
                    bucket_b
                        .internal_rank
                        .partial_cmp(&bucket_a.internal_rank)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.cmp(b))
        });
        self.order = keys;

        for bucket in self.buckets.values_mut() {
            let mut work_keys: Vec<Option<String>> = bucket.works.keys().cloned().collect();
            work_keys.sort_by(|a, b| {
                let rank_a = bucket.works[a].internal_rank();
                let rank_b = bucket.works[b].internal_rank();
                rank_b.partial_cmp(&rank_a).unwrap_or(Ordering::Equal).then_with(|| a.cmp(b))
            });
            bucket.work_order = work_keys;
        }
    }

    /// Number of resolved author identities.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets in presentation order (requires prior `rank` and `sort`).
    pub fn buckets_sorted(&self) -> impl Iterator<Item = &AuthorBucket> {
        self.order.iter().filter_map(|key| self.buckets.get(key))
    }

    /// Project the ranked, sorted state into serializable summaries.
    ///
    /// Pure: callable repeatedly with different limits without re-ranking.
    #[must_use]
    pub fn summaries(&self, limit: Option<usize>) -> Vec<AuthorSummary> {
        let take = limit.unwrap_or(usize::MAX);
        self.buckets_sorted().take(take).map(AuthorSummary::from_bucket).collect()
    }
}

/// Serializable projection of one ranked author bucket.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorSummary {
    /// Given name.
    pub given_name: Option<String>,

    /// Diverging given names from other sources.
    pub given_name_alternatives: Vec<String>,

    /// Surname.
    pub surname: Option<String>,

    /// Diverging surnames from other sources.
    pub surname_alternatives: Vec<String>,

    /// ORCID identifier.
    pub orcid: Option<String>,

    /// Conflicting ORCID values from other sources.
    pub orcid_alternatives: Vec<String>,

    /// Known email addresses.
    pub emails: Vec<String>,

    /// Known affiliations.
    pub institutions: Vec<Institution>,

    /// Name-match score against the target researcher (0-200).
    pub name_match_ratio: f64,

    /// Attributes that exactly matched the target researcher.
    pub perfect_match_count: u32,

    /// Bucket total rank.
    pub internal_rank: f64,

    /// The author's own rank breakdown.
    pub rank_breakdown: RankBreakdown,

    /// The bucket's works, in rank order.
    pub works: Vec<WorkSummary>,
}

/// Serializable projection of one deduplicated work.
#[derive(Debug, Clone, Serialize)]
pub struct WorkSummary {
    /// Digital Object Identifier.
    pub doi: Option<String>,

    /// Work title.
    pub title: Option<String>,

    /// Diverging titles from other sources.
    pub title_alternatives: Vec<String>,

    /// Known URLs.
    pub urls: Vec<String>,

    /// Publishers / venues.
    pub publishers: Vec<String>,

    /// Subject domains.
    pub domains: Vec<String>,

    /// Source the primary record came from.
    pub data_source: String,

    /// Work rank.
    pub internal_rank: f64,

    /// The work's rank breakdown.
    pub rank_breakdown: RankBreakdown,
}

impl AuthorSummary {
    fn from_bucket(bucket: &AuthorBucket) -> Self {
        let author = bucket.author();
        Self {
            given_name: author.given_name.clone(),
            given_name_alternatives: author.given_name_alternatives.iter().cloned().collect(),
            surname: author.surname.clone(),
            surname_alternatives: author.surname_alternatives.iter().cloned().collect(),
            orcid: author.orcid.clone(),
            orcid_alternatives: author.orcid_alternatives.iter().cloned().collect(),
            emails: author.emails.iter().cloned().collect(),
            institutions: author.institutions.iter().cloned().collect(),
            name_match_ratio: author.name_match_ratio,
            perfect_match_count: author.perfect_match_count(),
            internal_rank: bucket.internal_rank(),
            rank_breakdown: author.rank_breakdown().clone(),
            works: bucket.works_sorted().map(WorkSummary::from_work).collect(),
        }
    }
}

impl WorkSummary {
    fn from_work(work: &UnifiedWork) -> Self {
        Self {
            doi: work.doi.clone(),
            title: work.title.clone(),
            title_alternatives: work.title_alternatives.iter().cloned().collect(),
            urls: work.urls.iter().cloned().collect(),
            publishers: work.publishers.iter().cloned().collect(),
            domains: work.domains.iter().cloned().collect(),
            data_source: work.data_source.clone(),
            internal_rank: work.internal_rank(),
            rank_breakdown: work.rank_breakdown().clone(),
        }
    }
}
