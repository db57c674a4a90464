//! Line-level preview of a single search/replace.
//!
//! Read-only: the preview never feeds back into replacement. The line diff
//! itself is delegated to the `similar` crate.

use crate::matching::SearchMatch;
use crate::replace::apply_match;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Which side of the diff a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineKind {
    Old,
    New,
    Same,
}

/// One rendered diff record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    #[serde(rename = "type")]
    pub kind: DiffLineKind,
    pub line: String,
}

impl DiffLine {
    fn new(kind: DiffLineKind, line: &str) -> Self {
        Self {
            kind,
            line: line.to_string(),
        }
    }
}

/// Finite, single-pass sequence of diff records.
#[derive(Debug)]
pub struct DiffLines {
    inner: std::vec::IntoIter<DiffLine>,
}

impl Iterator for DiffLines {
    type Item = DiffLine;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for DiffLines {}

/// Diff two line sequences.
pub fn diff_lines(old_lines: &[&str], new_lines: &[&str]) -> DiffLines {
    let diff = TextDiff::from_slices(old_lines, new_lines);
    let records: Vec<DiffLine> = diff
        .iter_all_changes()
        .map(|change| {
            let kind = match change.tag() {
                ChangeTag::Delete => DiffLineKind::Old,
                ChangeTag::Insert => DiffLineKind::New,
                ChangeTag::Equal => DiffLineKind::Same,
            };
            DiffLine::new(kind, change.value())
        })
        .collect();
    DiffLines {
        inner: records.into_iter(),
    }
}

/// Preview what replacing `search_match` with `replacement` does to `content`.
///
/// A match whose range does not fit `content` yields no records.
pub fn generate_search_replace_diff_lines(
    content: &str,
    search_match: &SearchMatch,
    replacement: &str,
) -> DiffLines {
    if search_match.matched_text(content).is_none() {
        return DiffLines {
            inner: Vec::new().into_iter(),
        };
    }

    let updated = apply_match(content, search_match, replacement);
    let old_lines: Vec<&str> = content.lines().collect();
    let new_lines: Vec<&str> = updated.lines().collect();
    diff_lines(&old_lines, &new_lines)
}
