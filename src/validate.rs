//! Pre-flight checks on edit requests.
//!
//! Runs before any file content is touched. The tool layer hands over untyped
//! JSON arguments; these functions turn them into typed [`EditOperation`]s or
//! fail with a tagged [`PatchError`].
//!
//! # Rules
//!
//! 1. `old_string` and `new_string` must be strings; `new_string` may be
//!    empty (deletion).
//! 2. `replace_all`, when present, must be a boolean.
//! 3. `old_string` and `new_string` must differ.
//! 4. Only the first edit of a sequence may have an empty `old_string`.

use crate::error::PatchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One find-and-replace request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOperation {
    pub old_string: String,
    pub new_string: String,
    #[serde(default)]
    pub replace_all: bool,
}

impl EditOperation {
    pub fn new(old_string: impl Into<String>, new_string: impl Into<String>) -> Self {
        Self {
            old_string: old_string.into(),
            new_string: new_string.into(),
            replace_all: false,
        }
    }

    pub fn replace_all(mut self, replace_all: bool) -> Self {
        self.replace_all = replace_all;
        self
    }

    /// Checks that remain meaningful once the edit is already typed.
    pub fn validate(&self, edit_index: Option<usize>) -> Result<(), PatchError> {
        if self.old_string == self.new_string {
            return Err(PatchError::IdenticalOldAndNewStrings { edit_index });
        }
        Ok(())
    }
}

/// Validated arguments of a multi-edit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiEditArgs {
    pub edits: Vec<EditOperation>,
}

/// Validate one edit given as untyped fields and return it typed.
pub fn validate_single_edit(
    old_string: Option<&Value>,
    new_string: Option<&Value>,
    replace_all: Option<&Value>,
    edit_index: Option<usize>,
) -> Result<EditOperation, PatchError> {
    let old_string = old_string
        .and_then(Value::as_str)
        .ok_or(PatchError::MissingOldString { edit_index })?;

    let new_string = new_string
        .and_then(Value::as_str)
        .ok_or(PatchError::MissingNewString { edit_index })?;

    let replace_all = match replace_all {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => return Err(PatchError::InvalidReplaceAll { edit_index }),
    };

    let edit = EditOperation {
        old_string: old_string.to_string(),
        new_string: new_string.to_string(),
        replace_all,
    };
    edit.validate(edit_index)?;
    Ok(edit)
}

/// Validate the arguments of a multi-edit request.
///
/// Expects an object with an `edits` array. Elements are checked in order and
/// the first failure is reported.
pub fn validate_multi_edit(args: &Value) -> Result<MultiEditArgs, PatchError> {
    let raw_edits = args
        .get("edits")
        .and_then(Value::as_array)
        .ok_or(PatchError::EditsArrayRequired)?;

    if raw_edits.is_empty() {
        return Err(PatchError::EditsArrayEmpty);
    }

    let mut edits = Vec::with_capacity(raw_edits.len());
    for (index, raw) in raw_edits.iter().enumerate() {
        let edit = validate_single_edit(
            raw.get("old_string"),
            raw.get("new_string"),
            raw.get("replace_all"),
            Some(index),
        )?;
        if index > 0 && edit.old_string.is_empty() {
            return Err(PatchError::NonFirstEmptyOldString { edit_index: index });
        }
        edits.push(edit);
    }

    Ok(MultiEditArgs { edits })
}

/// The typed counterpart of [`validate_multi_edit`].
pub fn validate_edit_sequence(edits: &[EditOperation]) -> Result<(), PatchError> {
    if edits.is_empty() {
        return Err(PatchError::EditsArrayEmpty);
    }
    for (index, edit) in edits.iter().enumerate() {
        edit.validate(Some(index))?;
        if index > 0 && edit.old_string.is_empty() {
            return Err(PatchError::NonFirstEmptyOldString { edit_index: index });
        }
    }
    Ok(())
}

/// Whether `edits` creates a new file, i.e. starts with an empty `old_string`.
///
/// A creating sequence must consist of that single edit.
pub fn validate_creating_for_multi_edit(edits: &[EditOperation]) -> Result<bool, PatchError> {
    let first = edits.first().ok_or(PatchError::EditsArrayEmpty)?;
    let is_creating = first.old_string.is_empty();

    if is_creating && edits.len() > 1 {
        return Err(PatchError::SubsequentEditsOnNewFile {
            edit_count: edits.len(),
        });
    }

    if let Some(index) = edits
        .iter()
        .skip(1)
        .position(|edit| edit.old_string.is_empty())
    {
        return Err(PatchError::NonFirstEmptyOldString {
            edit_index: index + 1,
        });
    }

    Ok(is_creating)
}
