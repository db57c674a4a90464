//! Jaro-Winkler fuzzy matching, the last resort of the pipeline.
//!
//! Produces every region tied for the best score at or above the configured
//! threshold, so a candidate that appears twice is reported twice. Whole-block
//! windows are tried first, single lines second. Short inputs are rejected
//! instead of guessed at.

use super::strategy::MatchStrategy;
use super::StrategyName;
use serde::Deserialize;
use std::ops::Range;

/// Tuning for the fuzzy strategy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Whether the fuzzy strategy takes part in the pipeline at all.
    pub enabled: bool,
    /// Whether edits may be applied to a region only fuzzy matching located.
    /// Lookups use fuzzy matching whenever it is enabled.
    pub allow_edits: bool,
    /// Minimum Jaro-Winkler similarity (0.0 to 1.0) for a candidate.
    pub threshold: f64,
    /// The trimmed search block must be longer than this (in chars); candidate
    /// blocks shorter than this are skipped.
    pub min_block_chars: usize,
    /// Trimmed lines shorter than this (in chars) are never compared.
    pub min_line_chars: usize,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allow_edits: false,
            threshold: 0.9,
            min_block_chars: 5,
            min_line_chars: 3,
        }
    }
}

/// One line of the file: its byte span, without the `\n` terminator.
#[derive(Debug, Clone, Copy)]
struct LineSpan {
    start: usize,
    end: usize,
}

fn line_spans(content: &str) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    let mut start = 0;
    for line in content.split('\n') {
        let end = start + line.len();
        spans.push(LineSpan { start, end });
        start = end + 1;
    }
    spans
}

/// Narrow `range` of `content` to exclude leading and trailing whitespace.
fn trimmed_range(content: &str, range: Range<usize>) -> Range<usize> {
    let raw = &content[range.clone()];
    let start = range.start + (raw.len() - raw.trim_start().len());
    let end = range.start + raw.trim_end().len();
    start..end.max(start)
}

#[derive(Debug, Clone)]
struct Candidate {
    range: Range<usize>,
    score: f64,
}

/// Jaro-Winkler similarity search over line windows and single lines.
#[derive(Debug, Clone, Default)]
pub struct JaroWinklerFuzzyMatch {
    config: FuzzyConfig,
}

impl JaroWinklerFuzzyMatch {
    pub fn new(config: FuzzyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FuzzyConfig {
        &self.config
    }

    /// Keep `range` if it beats or ties the best score seen so far.
    fn consider(&self, best: &mut Vec<Candidate>, range: Range<usize>, score: f64) {
        if score < self.config.threshold {
            return;
        }
        match best.first().map(|current| current.score) {
            Some(current) if score < current => {}
            Some(current) if score == current => best.push(Candidate { range, score }),
            _ => {
                best.clear();
                best.push(Candidate { range, score });
            }
        }
    }

    /// Compare the whole trimmed search block against every window of the
    /// same number of file lines.
    fn best_block(
        &self,
        content: &str,
        lines: &[LineSpan],
        search: &str,
        best: &mut Vec<Candidate>,
    ) {
        let search_block = search.trim();
        if search_block.chars().count() <= self.config.min_block_chars {
            return;
        }

        let window = search.split('\n').count();
        if window > lines.len() {
            return;
        }

        for first in 0..=lines.len() - window {
            let span = lines[first].start..lines[first + window - 1].end;
            let range = trimmed_range(content, span);
            let candidate = &content[range.clone()];
            if candidate.chars().count() < self.config.min_block_chars {
                continue;
            }
            let score = strsim::jaro_winkler(search_block, candidate);
            self.consider(best, range, score);
        }
    }

    /// Compare each trimmed search line against each trimmed file line.
    fn best_line(
        &self,
        content: &str,
        lines: &[LineSpan],
        search: &str,
        best: &mut Vec<Candidate>,
    ) {
        for search_line in search.split('\n').map(str::trim) {
            if search_line.chars().count() < self.config.min_line_chars {
                continue;
            }
            for line in lines {
                let range = trimmed_range(content, line.start..line.end);
                let candidate = &content[range.clone()];
                if candidate.chars().count() < self.config.min_line_chars {
                    continue;
                }
                let score = strsim::jaro_winkler(search_line, candidate);
                self.consider(best, range, score);
            }
        }
    }
}

impl MatchStrategy for JaroWinklerFuzzyMatch {
    fn name(&self) -> StrategyName {
        StrategyName::JaroWinklerFuzzyMatch
    }

    fn find_all(&self, content: &str, search: &str) -> Vec<Range<usize>> {
        if !self.config.enabled || search.trim().is_empty() {
            return Vec::new();
        }

        let lines = line_spans(content);
        let mut best = Vec::new();
        self.best_block(content, &lines, search, &mut best);
        // Line granularity only when no whole-block window qualifies, so a
        // multi-line search never collapses onto a single line.
        if best.is_empty() {
            self.best_line(content, &lines, search, &mut best);
        }

        let mut ranges: Vec<Range<usize>> = Vec::with_capacity(best.len());
        best.sort_by_key(|candidate| (candidate.range.start, candidate.range.end));
        for candidate in best {
            if ranges.last().is_some_and(|last| {
                candidate.range.start < last.end || candidate.range == *last
            }) {
                continue;
            }
            tracing::trace!(
                score = candidate.score,
                start = candidate.range.start,
                end = candidate.range.end,
                "fuzzy candidate kept"
            );
            ranges.push(candidate.range);
        }
        ranges
    }
}
