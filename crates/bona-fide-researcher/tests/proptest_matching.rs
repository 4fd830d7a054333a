//! Property-based tests for the name matcher.

use proptest::prelude::*;

use bona_fide_researcher::NameMatcher;
use bona_fide_researcher::config::ranking;

proptest! {
    /// The combined ratio stays within 0..=200.
    #[test]
    fn ratio_is_bounded(
        candidate_given in "[A-Za-z]{1,12}",
        candidate_surname in "[A-Za-z]{1,12}",
        target_given in "[A-Za-z]{1,12}",
        target_surname in "[A-Za-z]{1,12}",
    ) {
        let matcher = NameMatcher::new(false);
        let ratio = matcher.name_match_ratio(
            &candidate_given, &candidate_surname, &target_given, &target_surname,
        );

        prop_assert!(ratio >= 0.0);
        prop_assert!(ratio <= ranking::PERFECT_NAME_MATCH_RATIO);
    }

    /// Identical names always score a perfect match.
    #[test]
    fn identical_names_are_perfect(
        given in "[A-Za-z]{1,12}",
        surname in "[A-Za-z]{1,12}",
    ) {
        let matcher = NameMatcher::new(false);
        let ratio = matcher.name_match_ratio(&given, &surname, &given, &surname);

        prop_assert_eq!(ratio, ranking::PERFECT_NAME_MATCH_RATIO);
    }

    /// Allowing uncertain name order never lowers the score.
    #[test]
    fn uncertain_order_is_monotone(
        candidate_given in "[A-Za-z]{1,12}",
        candidate_surname in "[A-Za-z]{1,12}",
        target_given in "[A-Za-z]{1,12}",
        target_surname in "[A-Za-z]{1,12}",
    ) {
        let certain = NameMatcher::new(false).name_match_ratio(
            &candidate_given, &candidate_surname, &target_given, &target_surname,
        );
        let uncertain = NameMatcher::new(true).name_match_ratio(
            &candidate_given, &candidate_surname, &target_given, &target_surname,
        );

        prop_assert!(uncertain >= certain);
    }

    /// A missing name part always yields a zero ratio.
    #[test]
    fn missing_part_scores_zero(
        given in "[A-Za-z]{0,12}",
        surname in "[A-Za-z]{1,12}",
    ) {
        let matcher = NameMatcher::new(true);
        let ratio = matcher.name_match_ratio("", &surname, &given, &surname);

        prop_assert_eq!(ratio, 0.0);
    }
}
