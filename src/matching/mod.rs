//! Locating search text inside file content.
//!
//! The [`Matcher`] runs a fixed pipeline of strategies, each a strictly
//! weaker notion of equality than the one before:
//!
//! 1. [`ExactMatch`] - byte-for-byte substring
//! 2. [`TrimmedMatch`] - search text with edge whitespace stripped
//! 3. [`CaseInsensitiveMatch`] - per-character lowercase folding
//! 4. [`WhitespaceIgnoredMatch`] - all whitespace removed on both sides
//! 5. [`JaroWinklerFuzzyMatch`] - approximate similarity, best-scoring regions
//!
//! The first strategy that yields at least one candidate wins; candidates are
//! never merged across strategies. Search text that is empty after trimming
//! short-circuits to a zero-length match at offset 0.
//!
//! Lookups run the whole pipeline. Edits stop before the fuzzy strategy
//! unless [`FuzzyConfig::allow_edits`] is set.

mod fuzzy;
mod strategy;

pub use fuzzy::{FuzzyConfig, JaroWinklerFuzzyMatch};
pub use strategy::{
    CaseInsensitiveMatch, ExactMatch, MatchStrategy, TrimmedMatch, WhitespaceIgnoredMatch,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Which equivalence relation produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StrategyName {
    EmptySearch,
    ExactMatch,
    TrimmedMatch,
    CaseInsensitiveMatch,
    WhitespaceIgnoredMatch,
    JaroWinklerFuzzyMatch,
}

impl StrategyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyName::EmptySearch => "emptySearch",
            StrategyName::ExactMatch => "exactMatch",
            StrategyName::TrimmedMatch => "trimmedMatch",
            StrategyName::CaseInsensitiveMatch => "caseInsensitiveMatch",
            StrategyName::WhitespaceIgnoredMatch => "whitespaceIgnoredMatch",
            StrategyName::JaroWinklerFuzzyMatch => "jaroWinklerFuzzyMatch",
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One located occurrence: a half-open byte range `[start_index, end_index)`
/// into the searched content, plus the strategy that found it.
///
/// Offsets always fall on `char` boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SearchMatch {
    pub start_index: usize,
    pub end_index: usize,
    pub strategy_name: StrategyName,
}

impl SearchMatch {
    pub fn new(range: Range<usize>, strategy_name: StrategyName) -> Self {
        Self {
            start_index: range.start,
            end_index: range.end,
            strategy_name,
        }
    }

    /// The zero-length match used for empty search text.
    pub fn empty_search() -> Self {
        Self::new(0..0, StrategyName::EmptySearch)
    }

    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// The matched slice of `content`, if the range is valid for it.
    pub fn matched_text<'a>(&self, content: &'a str) -> Option<&'a str> {
        content.get(self.range())
    }

    /// The same range expressed in UTF-16 code units, for hosts that index
    /// strings that way.
    pub fn utf16_range(&self, content: &str) -> Option<Range<usize>> {
        let prefix = content.get(..self.start_index)?;
        let matched = self.matched_text(content)?;
        let start = prefix.encode_utf16().count();
        Some(start..start + matched.encode_utf16().count())
    }
}

/// Matcher configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub fuzzy: FuzzyConfig,
}

/// The strategy pipeline. Stateless apart from its configuration, so one
/// instance can serve any number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    fuzzy: JaroWinklerFuzzyMatch,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self {
            fuzzy: JaroWinklerFuzzyMatch::new(config.fuzzy),
        }
    }

    pub fn fuzzy_config(&self) -> &FuzzyConfig {
        self.fuzzy.config()
    }

    fn strategies(&self) -> [&dyn MatchStrategy; 5] {
        [
            &ExactMatch,
            &TrimmedMatch,
            &CaseInsensitiveMatch,
            &WhitespaceIgnoredMatch,
            &self.fuzzy,
        ]
    }

    /// The first match of the first strategy that finds anything.
    pub fn find_match(&self, content: &str, search: &str) -> Option<SearchMatch> {
        if search.trim().is_empty() {
            return Some(SearchMatch::empty_search());
        }

        for strategy in self.strategies() {
            if let Some(range) = strategy.find_first(content, search) {
                log_selection(strategy.name(), 1);
                return Some(SearchMatch::new(range, strategy.name()));
            }
            tracing::trace!(strategy = %strategy.name(), "no candidate");
        }
        None
    }

    /// Every match of the first strategy that finds anything, left to right
    /// and non-overlapping. Empty when no strategy matches.
    pub fn find_matches(&self, content: &str, search: &str) -> Vec<SearchMatch> {
        self.collect_matches(content, search, true)
    }

    /// The match set an edit may be applied to.
    pub(crate) fn matches_for_edit(&self, content: &str, search: &str) -> Vec<SearchMatch> {
        self.collect_matches(content, search, self.fuzzy_config().allow_edits)
    }

    fn collect_matches(&self, content: &str, search: &str, with_fuzzy: bool) -> Vec<SearchMatch> {
        if search.trim().is_empty() {
            return vec![SearchMatch::empty_search()];
        }

        for strategy in self.strategies() {
            if !with_fuzzy && strategy.name() == StrategyName::JaroWinklerFuzzyMatch {
                tracing::trace!(strategy = %strategy.name(), "not allowed for edits");
                continue;
            }
            let ranges = strategy.find_all(content, search);
            if ranges.is_empty() {
                tracing::trace!(strategy = %strategy.name(), "no candidate");
                continue;
            }
            log_selection(strategy.name(), ranges.len());
            return ranges
                .into_iter()
                .map(|range| SearchMatch::new(range, strategy.name()))
                .collect();
        }
        Vec::new()
    }
}

fn log_selection(strategy: StrategyName, count: usize) {
    if strategy == StrategyName::JaroWinklerFuzzyMatch {
        tracing::warn!(%strategy, count, "search text located only by fuzzy matching");
    } else {
        tracing::debug!(%strategy, count, "search text located");
    }
}

/// Locate a single occurrence of `search` in `content` with the default
/// pipeline.
pub fn find_search_match(content: &str, search: &str) -> Option<SearchMatch> {
    Matcher::default().find_match(content, search)
}

/// Locate every occurrence of `search` in `content` with the default
/// pipeline.
pub fn find_search_matches(content: &str, search: &str) -> Vec<SearchMatch> {
    Matcher::default().find_matches(content, search)
}
