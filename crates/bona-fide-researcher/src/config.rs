//! Configuration for the verification service and the ranking model.

use std::time::Duration;

/// Ranking model constants.
///
/// Every weight and credit in the scoring model lives here by name; the
/// runtime-tunable [`RankingConfig`] defaults to these values.
pub mod ranking {
    /// Fuzzy-ratio floor granted to a matching name initial (X out of 100).
    pub const NAME_MATCH_THRESHOLD: f64 = 65.0;

    /// Combined given+surname score a candidate must clear to count as a
    /// matched author (out of 200).
    pub const NAME_MATCH_CUTOFF: f64 = 2.0 * NAME_MATCH_THRESHOLD;

    /// A combined name-match ratio of exactly this value is a perfect match.
    pub const PERFECT_NAME_MATCH_RATIO: f64 = 200.0;

    /// Weight of the matched author's rank within a work's rank.
    pub const MATCHED_AUTHOR_RANK_WEIGHT: f64 = 1.0;

    /// Weight of each co-author's rank within a work's rank.
    pub const COAUTHOR_RANK_WEIGHT: f64 = 0.2;

    /// Credit for a present DOI.
    pub const DOI_RANK_VALUE: f64 = 1.0;

    /// Credit per known URL.
    pub const URL_RANK_VALUE: f64 = 1.0;

    /// Credit for a present title.
    pub const TITLE_RANK_VALUE: f64 = 1.0;

    /// Credit per alternative title.
    pub const TITLE_ALTERNATIVE_RANK_VALUE: f64 = 1.0;

    /// Credit per known publisher.
    pub const PUBLISHER_RANK_VALUE: f64 = 1.0;

    /// Credit per known subject domain.
    pub const DOMAIN_RANK_VALUE: f64 = 1.0;

    /// Credit for a present ORCID on an author.
    pub const ORCID_PRESENCE_RANK_VALUE: f64 = 1.0;

    /// Credit for an ORCID exactly matching the target researcher's.
    pub const ORCID_EXACT_MATCH_RANK_VALUE: f64 = 50.0;

    /// Credit for an email exactly matching the target researcher's.
    pub const EMAIL_EXACT_MATCH_RANK_VALUE: f64 = 25.0;

    /// Credit for a present ROR or ISNI identifier on an institution.
    pub const IDENTIFIER_PRESENCE_RANK_VALUE: f64 = 1.0;

    /// Credit for a ROR/ISNI exactly matching the target affiliation.
    pub const AFFILIATION_EXACT_MATCH_RANK_VALUE: f64 = 50.0;

    /// Baseline credit for a present institution name.
    pub const INSTITUTION_NAME_PRESENCE_RANK_VALUE: f64 = 1.0;

    /// Scale applied to the institution-name fuzzy similarity (0..=1).
    pub const INSTITUTION_NAME_SIMILARITY_WEIGHT: f64 = 5.0;
}

/// External API constants.
pub mod api {
    use std::time::Duration;

    /// Crossref works endpoint.
    pub const CROSSREF_API_URL: &str = "https://api.crossref.org/works";

    /// ORCID expanded-search endpoint.
    pub const ORCID_API_URL: &str = "https://pub.orcid.org/v3.0/expanded-search/";

    /// EOSC Resource Hub catalogue endpoint.
    pub const EOSC_API_URL: &str =
        "https://api.open-science-cloud.ec.europa.eu/action/catalogue/items";

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Polite delay between requests to public APIs.
    pub const POLITE_DELAY: Duration = Duration::from_millis(200);

    /// Cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Rows requested per Crossref page.
    pub const CROSSREF_ROWS: usize = 1000;

    /// Maximum Crossref cursor pages fetched per query.
    pub const CROSSREF_PAGE_LIMIT: usize = 5;

    /// Rows requested from the ORCID expanded search.
    pub const ORCID_ROWS: usize = 1000;

    /// Records per EOSC page (more is prohibited by the EOSC API).
    pub const EOSC_ROWS: usize = 20;

    /// Maximum EOSC pages fetched per query.
    pub const EOSC_PAGE_LIMIT: usize = 5;
}

/// Runtime-tunable ranking weights and thresholds.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Fuzzy-ratio floor granted to a matching name initial.
    pub match_threshold: f64,

    /// Combined name score required for a matched author.
    pub name_match_cutoff: f64,

    /// Weight of the matched author within a work's rank.
    pub matched_author_weight: f64,

    /// Weight of each co-author within a work's rank.
    pub coauthor_weight: f64,

    /// Presence credit for a DOI.
    pub doi_value: f64,

    /// Credit per URL.
    pub url_value: f64,

    /// Presence credit for a title.
    pub title_value: f64,

    /// Credit per alternative title.
    pub title_alternative_value: f64,

    /// Credit per publisher.
    pub publisher_value: f64,

    /// Credit per subject domain.
    pub domain_value: f64,

    /// Presence credit for an ORCID.
    pub orcid_presence_value: f64,

    /// Credit for an exact ORCID match.
    pub orcid_exact_match_value: f64,

    /// Credit for an exact email match.
    pub email_exact_match_value: f64,

    /// Presence credit for a ROR/ISNI identifier.
    pub identifier_presence_value: f64,

    /// Credit for an exact ROR/ISNI affiliation match.
    pub affiliation_exact_match_value: f64,

    /// Baseline credit for a present institution name.
    pub institution_name_presence_value: f64,

    /// Scale applied to institution-name fuzzy similarity.
    pub institution_name_similarity_weight: f64,

    /// Whether a bucket's total adds the author's own rank on top of the
    /// author contribution already inside each work's rank. The reference
    /// behavior counts it twice; disable to sum work ranks only.
    pub bucket_includes_author_rank: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            match_threshold: ranking::NAME_MATCH_THRESHOLD,
            name_match_cutoff: ranking::NAME_MATCH_CUTOFF,
            matched_author_weight: ranking::MATCHED_AUTHOR_RANK_WEIGHT,
            coauthor_weight: ranking::COAUTHOR_RANK_WEIGHT,
            doi_value: ranking::DOI_RANK_VALUE,
            url_value: ranking::URL_RANK_VALUE,
            title_value: ranking::TITLE_RANK_VALUE,
            title_alternative_value: ranking::TITLE_ALTERNATIVE_RANK_VALUE,
            publisher_value: ranking::PUBLISHER_RANK_VALUE,
            domain_value: ranking::DOMAIN_RANK_VALUE,
            orcid_presence_value: ranking::ORCID_PRESENCE_RANK_VALUE,
            orcid_exact_match_value: ranking::ORCID_EXACT_MATCH_RANK_VALUE,
            email_exact_match_value: ranking::EMAIL_EXACT_MATCH_RANK_VALUE,
            identifier_presence_value: ranking::IDENTIFIER_PRESENCE_RANK_VALUE,
            affiliation_exact_match_value: ranking::AFFILIATION_EXACT_MATCH_RANK_VALUE,
            institution_name_presence_value: ranking::INSTITUTION_NAME_PRESENCE_RANK_VALUE,
            institution_name_similarity_weight: ranking::INSTITUTION_NAME_SIMILARITY_WEIGHT,
            bucket_includes_author_rank: true,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Static bearer token required on mutating web routes (optional).
    pub auth_token: Option<String>,

    /// Crossref works URL (overridable for mock servers).
    pub crossref_api_url: String,

    /// ORCID expanded-search URL (overridable for mock servers).
    pub orcid_api_url: String,

    /// EOSC catalogue URL (overridable for mock servers).
    pub eosc_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Polite delay between source requests.
    pub polite_delay: Duration,

    /// Response cache TTL.
    pub cache_ttl: Duration,

    /// Maximum response cache size.
    pub cache_max_size: u64,

    /// Ranking tunables.
    pub ranking: RankingConfig,
}

impl Config {
    /// Create a new configuration with an optional service auth token.
    #[must_use]
    pub fn new(auth_token: Option<String>) -> Self {
        Self {
            auth_token,
            crossref_api_url: api::CROSSREF_API_URL.to_string(),
            orcid_api_url: api::ORCID_API_URL.to_string(),
            eosc_api_url: api::EOSC_API_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            polite_delay: api::POLITE_DELAY,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            ranking: RankingConfig::default(),
        }
    }

    /// Create a test configuration pointing every source at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            auth_token: None,
            crossref_api_url: format!("{base_url}/works"),
            orcid_api_url: format!("{base_url}/expanded-search"),
            eosc_api_url: format!("{base_url}/catalogue/items"),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            polite_delay: Duration::from_millis(0), // No delay in tests
            cache_ttl: Duration::from_secs(0),      // No caching in tests
            cache_max_size: 0,
            ranking: RankingConfig::default(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let auth_token = std::env::var("BFR_AUTH_TOKEN").ok();
        Ok(Self::new(auth_token))
    }

    /// Check if a service auth token is configured.
    #[must_use]
    pub const fn has_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.auth_token.is_none());
        assert!(!config.has_auth_token());
        assert!(config.ranking.bucket_includes_author_rank);
    }

    #[test]
    fn test_config_for_testing_rewrites_urls() {
        let config = Config::for_testing("http://127.0.0.1:9999");
        assert_eq!(config.crossref_api_url, "http://127.0.0.1:9999/works");
        assert_eq!(config.orcid_api_url, "http://127.0.0.1:9999/expanded-search");
        assert_eq!(config.eosc_api_url, "http://127.0.0.1:9999/catalogue/items");
    }

    #[test]
    fn test_cutoff_is_twice_threshold() {
        assert_eq!(ranking::NAME_MATCH_CUTOFF, 130.0);
    }
}
