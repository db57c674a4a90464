//! Find-and-replace over a located match set.
//!
//! Matches are validated before anything is spliced. With `replace_all`, the
//! result is assembled from immutable slices of the original content, walking
//! the matches from last to first so no earlier offset is invalidated.

use crate::error::PatchError;
use crate::matching::{Matcher, SearchMatch, StrategyName};

/// Splice `replacement` into `content` over a single match.
pub fn apply_match(content: &str, search_match: &SearchMatch, replacement: &str) -> String {
    let mut result =
        String::with_capacity(content.len() - search_match.len() + replacement.len());
    result.push_str(&content[..search_match.start_index]);
    result.push_str(replacement);
    result.push_str(&content[search_match.end_index..]);
    result
}

/// Substitute every match, applying them from the highest offset down.
///
/// `matches` must be ordered left to right and non-overlapping.
pub fn apply_matches(content: &str, matches: &[SearchMatch], replacement: &str) -> String {
    let mut pieces: Vec<&str> = Vec::with_capacity(matches.len() * 2 + 1);
    let mut tail_start = content.len();
    for m in matches.iter().rev() {
        pieces.push(&content[m.end_index..tail_start]);
        pieces.push(replacement);
        tail_start = m.start_index;
    }
    pieces.push(&content[..tail_start]);
    pieces.reverse();
    pieces.concat()
}

impl Matcher {
    /// Replace `old_string` with `new_string` in `content`.
    ///
    /// Without `replace_all`, the search must resolve to exactly one match.
    /// With it, every match is replaced, which fuzzy matches never qualify for.
    /// `edit_index` is only used to give errors their position in a sequence.
    pub fn execute_find_and_replace(
        &self,
        content: &str,
        old_string: &str,
        new_string: &str,
        replace_all: bool,
        edit_index: Option<usize>,
    ) -> Result<String, PatchError> {
        let matches = self.matches_for_edit(content, old_string);

        if matches.is_empty() {
            return Err(PatchError::OldStringNotFound {
                search: old_string.to_string(),
                edit_index,
            });
        }

        if replace_all {
            if matches[0].strategy_name == StrategyName::JaroWinklerFuzzyMatch {
                return Err(PatchError::ApproximateReplaceAll {
                    search: old_string.to_string(),
                    edit_index,
                });
            }
            tracing::debug!(
                count = matches.len(),
                strategy = %matches[0].strategy_name,
                "replacing all occurrences"
            );
            return Ok(apply_matches(content, &matches, new_string));
        }

        if matches.len() > 1 {
            return Err(PatchError::MultipleOccurrences {
                search: old_string.to_string(),
                count: matches.len(),
                edit_index,
            });
        }

        Ok(apply_match(content, &matches[0], new_string))
    }
}

/// Replace `old_string` with `new_string` using the default pipeline.
pub fn execute_find_and_replace(
    content: &str,
    old_string: &str,
    new_string: &str,
    replace_all: bool,
    edit_index: Option<usize>,
) -> Result<String, PatchError> {
    Matcher::default().execute_find_and_replace(
        content,
        old_string,
        new_string,
        replace_all,
        edit_index,
    )
}
