//! Property tests for the matching pipeline and replacement

use proptest::prelude::*;
use resilient_patcher::replace::apply_match;
use resilient_patcher::{
    execute_find_and_replace, find_search_match, find_search_matches, SearchMatch, StrategyName,
};

/// A non-blank slice of `content` picked from two seeds.
fn pick_substring(content: &str, start_seed: usize, len_seed: usize) -> &str {
    let start = start_seed % content.len();
    let end = start + 1 + len_seed % (content.len() - start);
    &content[start..end]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_exact_substring_always_reports_exact_match(
        content in "[a-z \n]{1,60}",
        start_seed in any::<usize>(),
        len_seed in any::<usize>(),
    ) {
        let search = pick_substring(&content, start_seed, len_seed);
        prop_assume!(!search.trim().is_empty());

        let m = find_search_match(&content, search).unwrap();
        prop_assert_eq!(m.strategy_name, StrategyName::ExactMatch);
        prop_assert_eq!(m.matched_text(&content), Some(search));
    }

    #[test]
    fn prop_blank_search_is_empty_search(
        content in "\\PC{0,80}",
        search in "[ \t\n]{0,10}",
    ) {
        let expected = SearchMatch::new(0..0, StrategyName::EmptySearch);
        prop_assert_eq!(find_search_match(&content, &search), Some(expected));
        prop_assert_eq!(find_search_matches(&content, &search), vec![expected]);
    }

    #[test]
    fn prop_matches_are_ordered_and_disjoint(
        content in "[abAB \n]{0,60}",
        search in "[ab ]{1,5}",
    ) {
        let matches = find_search_matches(&content, &search);

        for m in &matches {
            prop_assert!(m.end_index <= content.len());
            prop_assert!(m.matched_text(&content).is_some());
            prop_assert_eq!(m.strategy_name, matches[0].strategy_name);
        }
        for pair in matches.windows(2) {
            prop_assert!(pair[0].end_index <= pair[1].start_index);
        }
    }

    #[test]
    fn prop_matches_respect_char_boundaries(
        content in "[aé日 \n]{0,40}",
        search in "[aé日 ]{1,4}",
    ) {
        for m in find_search_matches(&content, &search) {
            prop_assert!(content.is_char_boundary(m.start_index));
            prop_assert!(content.is_char_boundary(m.end_index));
        }
    }

    #[test]
    fn prop_replacement_is_found_where_it_was_spliced(
        content in "[a-z \n]{1,60}",
        start_seed in any::<usize>(),
        len_seed in any::<usize>(),
        replacement in "<[A-Z]{1,6}>",
    ) {
        let search = pick_substring(&content, start_seed, len_seed);
        prop_assume!(!search.trim().is_empty());

        let m = find_search_match(&content, search).unwrap();
        let spliced = apply_match(&content, &m, &replacement);

        let found = find_search_match(&spliced, &replacement).unwrap();
        prop_assert_eq!(found.strategy_name, StrategyName::ExactMatch);
        prop_assert_eq!(found.range(), m.start_index..m.start_index + replacement.len());
    }

    #[test]
    fn prop_replace_all_replaces_every_occurrence(
        segments in prop::collection::vec("[a-w ]{0,8}", 2..8),
    ) {
        let content = segments.join("XYZ");
        let occurrences = segments.len() - 1;

        let result = execute_find_and_replace(&content, "XYZ", "#", true, None).unwrap();
        prop_assert_eq!(result.matches('#').count(), occurrences);
        prop_assert!(!result.contains("XYZ"));
    }

    #[test]
    fn prop_single_replace_requires_unique_match(
        segments in prop::collection::vec("[a-w ]{0,8}", 2..6),
    ) {
        let content = segments.join("XYZ");
        let result = execute_find_and_replace(&content, "XYZ", "#", false, None);
        if segments.len() == 2 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }
}
