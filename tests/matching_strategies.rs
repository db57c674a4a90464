//! Integration tests for the match strategy pipeline
//!
//! Each test drives the public API with content shaped the way imperfect
//! search text actually arrives: re-indented, re-cased, or retyped.

use resilient_patcher::{
    execute_find_and_replace, find_search_match, find_search_matches, ErrorReason, FuzzyConfig,
    Matcher, MatcherConfig, SearchMatch, StrategyName,
};

fn matched<'a>(content: &'a str, m: &SearchMatch) -> &'a str {
    m.matched_text(content).unwrap()
}

#[test]
fn test_exact_match_wins_over_later_strategies() {
    let content = "const a = 1;\nconst A = 1;";
    let m = find_search_match(content, "const A = 1;").unwrap();
    assert_eq!(m.strategy_name, StrategyName::ExactMatch);
    assert_eq!(m.start_index, 13);
    assert_eq!(matched(content, &m), "const A = 1;");
}

#[test]
fn test_trimmed_match_ignores_surrounding_blank_lines() {
    let content = "foo();\nbar();\nbaz();";
    let m = find_search_match(content, "\n  bar();\n").unwrap();
    assert_eq!(m.strategy_name, StrategyName::TrimmedMatch);
    assert_eq!(matched(content, &m), "bar();");
}

#[test]
fn test_case_insensitive_match() {
    let content = "function HelloWorld() {}";
    let m = find_search_match(content, "function helloworld() {}").unwrap();
    assert_eq!(m.strategy_name, StrategyName::CaseInsensitiveMatch);
    assert_eq!(m.range(), 0..content.len());
}

#[test]
fn test_whitespace_reformatted_function() {
    let content = "function test() {\n  return true;\n}";
    let m = find_search_match(content, "function test(){return true;}").unwrap();
    assert_eq!(m.strategy_name, StrategyName::WhitespaceIgnoredMatch);
    assert_eq!(m.start_index, 0);
    assert_eq!(m.end_index, content.len());
}

#[test]
fn test_fuzzy_match_for_typo() {
    let content = "const userName = 'John';";
    let m = find_search_match(content, "const usrName = 'John';").unwrap();
    assert_eq!(m.strategy_name, StrategyName::JaroWinklerFuzzyMatch);
    assert_eq!(matched(content, &m), content);
}

#[test]
fn test_fuzzy_disabled_reports_no_match() {
    let matcher = Matcher::new(MatcherConfig {
        fuzzy: FuzzyConfig {
            enabled: false,
            ..FuzzyConfig::default()
        },
    });
    assert!(matcher
        .find_match("const userName = 'John';", "const usrName = 'John';")
        .is_none());
    assert!(matcher.find_matches("const userName = 'John';", "const usrName = 'John';").is_empty());
}

#[test]
fn test_fuzzy_match_is_located_but_not_edited_by_default() {
    let content = "const userName = 'John';";
    let search = "const usrName = 'John';";
    assert!(find_search_match(content, search).is_some());

    let err = execute_find_and_replace(content, search, "const userName = 'Jane';", false, None)
        .unwrap_err();
    assert_eq!(err.reason(), ErrorReason::OldStringNotFound);
}

#[test]
fn test_fuzzy_edits_when_opted_in() {
    let matcher = Matcher::new(MatcherConfig {
        fuzzy: FuzzyConfig {
            allow_edits: true,
            ..FuzzyConfig::default()
        },
    });
    let content = "fn main() {\n    console.log('Debug info');\n}";

    let result = matcher
        .execute_find_and_replace(content, "console.log('Debug nfo');", "trace();", false, None)
        .unwrap();
    assert_eq!(result, "fn main() {\n    trace();\n}");

    let duplicated = "    retry_count += 1;\nlog();\n    retry_count += 1;\n";
    let err = matcher
        .execute_find_and_replace(duplicated, "retry_cuont += 1;", "retry += 2;", false, None)
        .unwrap_err();
    assert_eq!(err.reason(), ErrorReason::MultipleOccurrences);

    let err = matcher
        .execute_find_and_replace(duplicated, "retry_cuont += 1;", "X", true, None)
        .unwrap_err();
    assert_eq!(err.reason(), ErrorReason::ApproximateReplaceAll);
    assert_eq!(matcher.find_matches(duplicated, "retry_cuont += 1;").len(), 2);
}

#[test]
fn test_unrelated_search_is_not_found() {
    assert!(find_search_match("fn main() {}\n", "completely different text here").is_none());
}

#[test]
fn test_empty_and_whitespace_search() {
    for content in ["", "some content", "line1\nline2"] {
        for search in ["", "   \n\t "] {
            let m = find_search_match(content, search).unwrap();
            assert_eq!(m, SearchMatch::new(0..0, StrategyName::EmptySearch));

            let all = find_search_matches(content, search);
            assert_eq!(all, vec![SearchMatch::new(0..0, StrategyName::EmptySearch)]);
        }
    }
}

#[test]
fn test_multibyte_offsets_stay_on_char_boundaries() {
    let content = "let café = 1;\nlet CAFÉ = 2;";
    let m = find_search_match(content, "let Café = 1;").unwrap();
    assert_eq!(m.strategy_name, StrategyName::CaseInsensitiveMatch);
    assert_eq!(m.range(), 0..14);
    assert_eq!(matched(content, &m), "let café = 1;");
    assert_eq!(m.utf16_range(content), Some(0..13));
}

#[test]
fn test_find_all_uses_one_strategy() {
    let content = "x = 1\ny = 2\nx = 1";
    let all = find_search_matches(content, " x = 1 ");
    assert_eq!(all.len(), 2);
    assert!(all
        .iter()
        .all(|m| m.strategy_name == StrategyName::TrimmedMatch));
    assert!(all[0].end_index <= all[1].start_index);
}

#[test]
fn test_replace_single_occurrence() {
    let result = execute_find_and_replace(
        "Hello world\nThis is a test file\nGoodbye",
        "Hello",
        "Hi",
        false,
        None,
    )
    .unwrap();
    assert_eq!(result, "Hi world\nThis is a test file\nGoodbye");
}

#[test]
fn test_replace_ambiguous_is_refused() {
    let err = execute_find_and_replace(
        "Hello world\nHello again\nHello there",
        "Hello",
        "Hi",
        false,
        None,
    )
    .unwrap_err();
    assert_eq!(err.reason(), ErrorReason::MultipleOccurrences);
    assert!(err.to_string().contains("appears 3 times"));
    assert!(err.to_string().contains("replace_all=true"));
}

#[test]
fn test_replace_missing_reports_search() {
    let err = execute_find_and_replace("abc", "xyz", "q", false, Some(2)).unwrap_err();
    assert_eq!(err.reason(), ErrorReason::OldStringNotFound);
    assert_eq!(err.edit_index(), Some(2));
    assert!(err.to_string().starts_with("edit at index 2: "));
}

#[test]
fn test_replace_all_case_insensitive() {
    let result = execute_find_and_replace("Foo foo FOO", "fOO", "bar", true, None).unwrap();
    assert_eq!(result, "bar bar bar");
}

#[test]
fn test_replace_all_whitespace_ignored() {
    let result = execute_find_and_replace("a b\na  b", "ab", "X", true, None).unwrap();
    assert_eq!(result, "X\nX");
}

#[test]
fn test_replace_preserves_surrounding_indentation() {
    let content = "fn main() {\n    let x = 1;\n}";
    let result = execute_find_and_replace(content, "\nlet x = 1;\n", "let x = 2;", false, None)
        .unwrap();
    assert_eq!(result, "fn main() {\n    let x = 2;\n}");
}

#[test]
fn test_insert_with_empty_search() {
    let result = execute_find_and_replace("body", "", "head\n", false, None).unwrap();
    assert_eq!(result, "head\nbody");
}
