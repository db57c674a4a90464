//! Sequential multi-edit over one file.
//!
//! Edits are folded in order: edit `i + 1` is resolved against the output of
//! edit `i`, never against the original content. The fold either yields the
//! final content or fails at the first broken edit, so callers that persist
//! only `Ok` values get all-or-nothing behavior.

use crate::error::PatchError;
use crate::matching::Matcher;
use crate::validate::EditOperation;

impl Matcher {
    /// Apply `edits` to `content` in order.
    ///
    /// A failing step is reported as [`PatchError::EditChainInvalid`] wrapping
    /// the underlying error; no partial result is ever returned.
    pub fn execute_multi_find_and_replace(
        &self,
        content: &str,
        edits: &[EditOperation],
    ) -> Result<String, PatchError> {
        let mut current = content.to_string();

        for (index, edit) in edits.iter().enumerate() {
            current = self
                .execute_find_and_replace(
                    &current,
                    &edit.old_string,
                    &edit.new_string,
                    edit.replace_all,
                    Some(index),
                )
                .map_err(|cause| PatchError::EditChainInvalid {
                    edit_index: index,
                    found_in_original: !self.matches_for_edit(content, &edit.old_string).is_empty(),
                    cause: Box::new(cause),
                })?;
            tracing::debug!(edit_index = index, len = current.len(), "edit applied");
        }

        Ok(current)
    }
}

/// Apply `edits` to `content` in order using the default pipeline.
pub fn execute_multi_find_and_replace(
    content: &str,
    edits: &[EditOperation],
) -> Result<String, PatchError> {
    Matcher::default().execute_multi_find_and_replace(content, edits)
}
