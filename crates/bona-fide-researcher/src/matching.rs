//! Fuzzy name matching between a candidate author and the target researcher.
//!
//! Scores are the sum of a per-field normalized similarity ratio (0-100 each,
//! 0-200 combined). A bare initial ("M" or "M.") whose letter matches the
//! target given name is floored at the configured match threshold instead of
//! its raw fuzzy ratio. With uncertain name order, every comparison is also
//! run with the target fields swapped and the best combination wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ranking;

/// A single character optionally followed by a period, e.g. "M" or "M.".
static NAME_INITIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^.]\.?$").expect("valid name-initial regex"));

/// Normalized similarity ratio between two strings, scaled to 0-100.
#[must_use]
pub fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Fuzzy matcher for (given name, surname) pairs.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    uncertain_name_order: bool,
    match_threshold: f64,
}

impl NameMatcher {
    /// Create a matcher with the default match threshold.
    #[must_use]
    pub fn new(uncertain_name_order: bool) -> Self {
        Self::with_threshold(uncertain_name_order, ranking::NAME_MATCH_THRESHOLD)
    }

    /// Create a matcher with an explicit initial-match threshold.
    #[must_use]
    pub const fn with_threshold(uncertain_name_order: bool, match_threshold: f64) -> Self {
        Self { uncertain_name_order, match_threshold }
    }

    /// Combined name-match ratio in [0, 200].
    ///
    /// Returns 0 when any of the four name parts is empty. The candidate and
    /// target labels are not interchangeable; swapping fields *within* one
    /// side is the uncertain-name-order behavior.
    #[must_use]
    pub fn name_match_ratio(
        &self,
        candidate_given_name: &str,
        candidate_surname: &str,
        target_given_name: &str,
        target_surname: &str,
    ) -> f64 {
        if candidate_given_name.is_empty()
            || candidate_surname.is_empty()
            || target_given_name.is_empty()
            || target_surname.is_empty()
        {
            return 0.0;
        }

        let mut combined_max = 0.0f64;

        let given_ratio = fuzzy_ratio(candidate_given_name, target_given_name);
        let surname_ratio = fuzzy_ratio(candidate_surname, target_surname);
        combined_max = combined_max.max(given_ratio + surname_ratio);

        // Initials only get at least the minimum match threshold
        let is_name_initial = NAME_INITIAL.is_match(candidate_given_name);

        if is_name_initial && first_chars_match(candidate_given_name, target_given_name) {
            combined_max = combined_max.max(self.match_threshold + surname_ratio);
        }

        if self.uncertain_name_order {
            let swapped_given_ratio = fuzzy_ratio(candidate_given_name, target_surname);
            let swapped_surname_ratio = fuzzy_ratio(candidate_surname, target_given_name);
            combined_max = combined_max.max(swapped_given_ratio + swapped_surname_ratio);

            if is_name_initial && first_chars_match(candidate_given_name, target_surname) {
                combined_max = combined_max.max(self.match_threshold + swapped_surname_ratio);
            }
        }

        combined_max
    }
}

fn first_chars_match(a: &str, b: &str) -> bool {
    match (a.chars().next(), b.chars().next()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_scores_zero() {
        let matcher = NameMatcher::new(false);
        assert_eq!(matcher.name_match_ratio("", "Doe", "Jane", "Doe"), 0.0);
        assert_eq!(matcher.name_match_ratio("Jane", "", "Jane", "Doe"), 0.0);
        assert_eq!(matcher.name_match_ratio("Jane", "Doe", "", "Doe"), 0.0);
        assert_eq!(matcher.name_match_ratio("Jane", "Doe", "Jane", ""), 0.0);
    }

    #[test]
    fn test_exact_match_scores_200() {
        let matcher = NameMatcher::new(false);
        assert_eq!(matcher.name_match_ratio("Jane", "Doe", "Jane", "Doe"), 200.0);
    }

    #[test]
    fn test_per_field_symmetry() {
        let matcher = NameMatcher::new(false);
        let forward = matcher.name_match_ratio("Jiri", "Novak", "Jiří", "Novák");
        let backward = matcher.name_match_ratio("Jiří", "Novák", "Jiri", "Novak");
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_initial_floors_given_name_component() {
        let matcher = NameMatcher::new(false);
        let score = matcher.name_match_ratio("M", "Kovács", "Mihály", "Kovács");
        assert!(score >= ranking::NAME_MATCH_THRESHOLD + 100.0);

        let dotted = matcher.name_match_ratio("M.", "Kovács", "Mihály", "Kovács");
        assert!(dotted >= ranking::NAME_MATCH_THRESHOLD + 100.0);
    }

    #[test]
    fn test_initial_replaces_rather_than_adds() {
        let matcher = NameMatcher::new(false);
        let score = matcher.name_match_ratio("M", "Kovács", "Mihály", "Kovács");
        // The floor replaces the fuzzy given-name ratio, it is not summed on top.
        assert!(score <= ranking::NAME_MATCH_THRESHOLD + 100.0 + f64::EPSILON);
    }

    #[test]
    fn test_wrong_initial_gets_no_floor() {
        let matcher = NameMatcher::new(false);
        let floored = matcher.name_match_ratio("X", "Kovács", "Mihály", "Kovács");
        assert!(floored < ranking::NAME_MATCH_THRESHOLD + 100.0);
    }

    #[test]
    fn test_uncertain_order_matches_swapped_names() {
        let certain = NameMatcher::new(false);
        let uncertain = NameMatcher::new(true);

        let swapped_certain = certain.name_match_ratio("Doe", "Jane", "Jane", "Doe");
        let swapped_uncertain = uncertain.name_match_ratio("Doe", "Jane", "Jane", "Doe");

        assert!(swapped_certain < 200.0);
        assert_eq!(swapped_uncertain, 200.0);
    }

    #[test]
    fn test_uncertain_order_never_decreases_score() {
        let certain = NameMatcher::new(false);
        let uncertain = NameMatcher::new(true);

        for (cg, cs, tg, ts) in [
            ("Jane", "Doe", "Jane", "Doe"),
            ("Doe", "Jane", "Jane", "Doe"),
            ("J", "Doe", "Jane", "Doe"),
            ("Zoltan", "Szabo", "Zoltán", "Szabó"),
        ] {
            let base = certain.name_match_ratio(cg, cs, tg, ts);
            let widened = uncertain.name_match_ratio(cg, cs, tg, ts);
            assert!(widened >= base, "uncertain order lowered score for {cg} {cs}");
        }
    }

    #[test]
    fn test_initial_regex_shape() {
        assert!(NAME_INITIAL.is_match("M"));
        assert!(NAME_INITIAL.is_match("M."));
        assert!(!NAME_INITIAL.is_match("Mi"));
        assert!(!NAME_INITIAL.is_match(".M"));
        assert!(!NAME_INITIAL.is_match(""));
    }
}
