//! Literal and normalized match strategies.
//!
//! Each strategy scans left to right and returns every non-overlapping
//! occurrence it recognizes as byte ranges into the file content. After a
//! match ending at `e`, scanning resumes at `e`.

use super::StrategyName;
use std::ops::Range;

/// A single notion of "equal enough" between file content and search text.
pub trait MatchStrategy {
    /// Tag attached to every candidate this strategy produces.
    fn name(&self) -> StrategyName;

    /// All non-overlapping occurrences, in file order.
    fn find_all(&self, content: &str, search: &str) -> Vec<Range<usize>>;

    /// The first occurrence only.
    fn find_first(&self, content: &str, search: &str) -> Option<Range<usize>> {
        self.find_all(content, search).into_iter().next()
    }
}

/// Byte-for-byte substring search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl MatchStrategy for ExactMatch {
    fn name(&self) -> StrategyName {
        StrategyName::ExactMatch
    }

    fn find_all(&self, content: &str, search: &str) -> Vec<Range<usize>> {
        if search.is_empty() {
            return Vec::new();
        }
        content
            .match_indices(search)
            .map(|(start, matched)| start..start + matched.len())
            .collect()
    }

    fn find_first(&self, content: &str, search: &str) -> Option<Range<usize>> {
        if search.is_empty() {
            return None;
        }
        content
            .find(search)
            .map(|start| start..start + search.len())
    }
}

/// Exact search for the search text with its edge whitespace stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimmedMatch;

impl MatchStrategy for TrimmedMatch {
    fn name(&self) -> StrategyName {
        StrategyName::TrimmedMatch
    }

    fn find_all(&self, content: &str, search: &str) -> Vec<Range<usize>> {
        ExactMatch.find_all(content, search.trim())
    }

    fn find_first(&self, content: &str, search: &str) -> Option<Range<usize>> {
        ExactMatch.find_first(content, search.trim())
    }
}

/// Per-character lowercase folding. Non-letters still have to line up
/// exactly; the span is measured in the file's own bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseInsensitiveMatch;

impl CaseInsensitiveMatch {
    /// Length in bytes of the prefix of `haystack` matching `needle`, if any.
    fn match_at(haystack: &str, needle: &[char]) -> Option<usize> {
        let mut chars = haystack.char_indices();
        for &expected in needle {
            let (_, actual) = chars.next()?;
            if !chars_eq_folded(actual, expected) {
                return None;
            }
        }
        Some(chars.next().map_or(haystack.len(), |(offset, _)| offset))
    }
}

impl MatchStrategy for CaseInsensitiveMatch {
    fn name(&self) -> StrategyName {
        StrategyName::CaseInsensitiveMatch
    }

    fn find_all(&self, content: &str, search: &str) -> Vec<Range<usize>> {
        let needle: Vec<char> = search.chars().collect();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        let mut pos = 0;
        while pos < content.len() {
            let rest = &content[pos..];
            match Self::match_at(rest, &needle) {
                Some(len) => {
                    matches.push(pos..pos + len);
                    pos += len;
                }
                None => {
                    pos += rest.chars().next().map_or(1, char::len_utf8);
                }
            }
        }
        matches
    }
}

fn chars_eq_folded(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Compares with all whitespace removed from both sides, then projects the
/// match back onto the original file offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceIgnoredMatch;

/// File content with whitespace removed, plus the original byte offset of
/// every byte in the stripped text.
struct StrippedText {
    text: String,
    origin: Vec<usize>,
}

impl StrippedText {
    fn new(content: &str) -> Self {
        let mut text = String::with_capacity(content.len());
        let mut origin = Vec::with_capacity(content.len());
        for (offset, ch) in content.char_indices() {
            if ch.is_whitespace() {
                continue;
            }
            text.push(ch);
            origin.extend(offset..offset + ch.len_utf8());
        }
        Self { text, origin }
    }

    /// Map a non-empty stripped range back to the original content.
    fn project(&self, stripped: Range<usize>) -> Range<usize> {
        let start = self.origin[stripped.start];
        let end = self.origin[stripped.end - 1] + 1;
        start..end
    }
}

impl MatchStrategy for WhitespaceIgnoredMatch {
    fn name(&self) -> StrategyName {
        StrategyName::WhitespaceIgnoredMatch
    }

    fn find_all(&self, content: &str, search: &str) -> Vec<Range<usize>> {
        let needle: String = search.chars().filter(|c| !c.is_whitespace()).collect();
        if needle.is_empty() {
            return Vec::new();
        }

        let stripped = StrippedText::new(content);
        stripped
            .text
            .match_indices(needle.as_str())
            .map(|(start, matched)| stripped.project(start..start + matched.len()))
            .collect()
    }
}
