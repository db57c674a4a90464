use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Remediation appended to ambiguity errors.
pub const FOUND_MULTIPLE_FIND_STRINGS_ERROR: &str = "Either provide a more specific string with \
surrounding context to make it unique, or use replace_all=true to replace all occurrences.";

/// Message used when a non-first edit carries an empty `old_string`.
pub const EMPTY_NON_FIRST_EDIT_MESSAGE: &str = "contains empty old_string. Only the first edit \
can contain an empty old_string, which is only used for file creation.";

/// Closed set of failure reasons callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorReason {
    OldStringNotFound,
    MultipleOccurrences,
    ApproximateReplaceAll,
    MissingOldString,
    MissingNewString,
    IdenticalOldAndNewStrings,
    InvalidReplaceAll,
    EditsArrayRequired,
    EditsArrayEmpty,
    NonFirstEmptyOldString,
    SubsequentEditsOnNewFile,
    EditChainInvalid,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors raised by validation, matching, and replacement.
///
/// Every variant carries enough context (edit index, search text, occurrence
/// count) to render a message without re-deriving state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("{}string not found in file: {:?}", edit_prefix(.edit_index), .search)]
    OldStringNotFound {
        search: String,
        edit_index: Option<usize>,
    },

    #[error(
        "{}String {:?} appears {} times in the file. {}",
        edit_prefix(.edit_index),
        .search,
        .count,
        FOUND_MULTIPLE_FIND_STRINGS_ERROR
    )]
    MultipleOccurrences {
        search: String,
        count: usize,
        edit_index: Option<usize>,
    },

    #[error(
        "{}String {:?} was only located approximately; replace_all needs old_string to match \
         the file exactly",
        edit_prefix(.edit_index),
        .search
    )]
    ApproximateReplaceAll {
        search: String,
        edit_index: Option<usize>,
    },

    #[error("{}old_string is required", edit_prefix(.edit_index))]
    MissingOldString { edit_index: Option<usize> },

    #[error("{}new_string is required", edit_prefix(.edit_index))]
    MissingNewString { edit_index: Option<usize> },

    #[error("{}old_string and new_string must be different", edit_prefix(.edit_index))]
    IdenticalOldAndNewStrings { edit_index: Option<usize> },

    #[error("{}replace_all must be a boolean", edit_prefix(.edit_index))]
    InvalidReplaceAll { edit_index: Option<usize> },

    #[error("edits must be an array of edit operations")]
    EditsArrayRequired,

    #[error("edits array must contain at least one edit")]
    EditsArrayEmpty,

    #[error("edit at index {edit_index}: {}", EMPTY_NON_FIRST_EDIT_MESSAGE)]
    NonFirstEmptyOldString { edit_index: usize },

    #[error(
        "cannot make subsequent edits on a file you are creating ({edit_count} edits given, \
         expected 1)"
    )]
    SubsequentEditsOnNewFile { edit_count: usize },

    #[error("{}", chain_message(.edit_index, .found_in_original, .cause))]
    EditChainInvalid {
        edit_index: usize,
        /// Whether the failing edit's old_string could be located in the
        /// content before any edit ran.
        found_in_original: bool,
        cause: Box<PatchError>,
    },
}

impl PatchError {
    /// The reason tag for this error.
    pub fn reason(&self) -> ErrorReason {
        match self {
            PatchError::OldStringNotFound { .. } => ErrorReason::OldStringNotFound,
            PatchError::MultipleOccurrences { .. } => ErrorReason::MultipleOccurrences,
            PatchError::ApproximateReplaceAll { .. } => ErrorReason::ApproximateReplaceAll,
            PatchError::MissingOldString { .. } => ErrorReason::MissingOldString,
            PatchError::MissingNewString { .. } => ErrorReason::MissingNewString,
            PatchError::IdenticalOldAndNewStrings { .. } => ErrorReason::IdenticalOldAndNewStrings,
            PatchError::InvalidReplaceAll { .. } => ErrorReason::InvalidReplaceAll,
            PatchError::EditsArrayRequired => ErrorReason::EditsArrayRequired,
            PatchError::EditsArrayEmpty => ErrorReason::EditsArrayEmpty,
            PatchError::NonFirstEmptyOldString { .. } => ErrorReason::NonFirstEmptyOldString,
            PatchError::SubsequentEditsOnNewFile { .. } => ErrorReason::SubsequentEditsOnNewFile,
            PatchError::EditChainInvalid { .. } => ErrorReason::EditChainInvalid,
        }
    }

    /// The reason of the innermost error, looking through edit-chain wrapping.
    pub fn root_reason(&self) -> ErrorReason {
        match self {
            PatchError::EditChainInvalid { cause, .. } => cause.root_reason(),
            other => other.reason(),
        }
    }

    /// Index of the edit that failed, when known.
    pub fn edit_index(&self) -> Option<usize> {
        match self {
            PatchError::OldStringNotFound { edit_index, .. }
            | PatchError::MultipleOccurrences { edit_index, .. }
            | PatchError::ApproximateReplaceAll { edit_index, .. }
            | PatchError::MissingOldString { edit_index }
            | PatchError::MissingNewString { edit_index }
            | PatchError::IdenticalOldAndNewStrings { edit_index }
            | PatchError::InvalidReplaceAll { edit_index } => *edit_index,
            PatchError::NonFirstEmptyOldString { edit_index }
            | PatchError::EditChainInvalid { edit_index, .. } => Some(*edit_index),
            PatchError::EditsArrayRequired
            | PatchError::EditsArrayEmpty
            | PatchError::SubsequentEditsOnNewFile { .. } => None,
        }
    }
}

fn edit_prefix(edit_index: &Option<usize>) -> String {
    match edit_index {
        Some(index) => format!("edit at index {index}: "),
        None => String::new(),
    }
}

fn chain_message(edit_index: &usize, found_in_original: &bool, cause: &PatchError) -> String {
    let problem = match cause {
        PatchError::OldStringNotFound { search, .. } if *found_in_original => {
            format!("string {search:?} not found after applying previous edits")
        }
        PatchError::OldStringNotFound { search, .. } => {
            format!("string {search:?} not found in original file")
        }
        PatchError::MultipleOccurrences { search, count, .. } => format!(
            "string {search:?} appears {count} times. {FOUND_MULTIPLE_FIND_STRINGS_ERROR}"
        ),
        other => other.to_string(),
    };

    if *edit_index == 0 || !*found_in_original {
        format!("Edit {edit_index} will fail: {problem}")
    } else {
        format!(
            "Edit {edit_index} will fail: {problem}. Consider reordering edits or updating \
             old_string to match the content produced by earlier edits."
        )
    }
}
