use crate::error::PatchError;
use crate::matching::MatcherConfig;
use crate::validate::{validate_creating_for_multi_edit, validate_edit_sequence, EditOperation};
use serde::Deserialize;
use std::fmt;

/// A batch of edit sequences, one per target file.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditPlan {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub files: Vec<FilePlan>,
}

impl EditPlan {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.files.is_empty() {
            issues.push(ValidationIssue::EmptyFileList);
        }

        let threshold = self.matcher.fuzzy.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            issues.push(ValidationIssue::InvalidThreshold(threshold));
        }

        for file in &self.files {
            if file.path.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    path: None,
                    field: "path",
                });
                continue;
            }
            if file.edits.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    path: Some(file.path.clone()),
                    field: "edits",
                });
                continue;
            }

            let checked = validate_edit_sequence(&file.edits)
                .and_then(|()| validate_creating_for_multi_edit(&file.edits));
            if let Err(error) = checked {
                issues.push(ValidationIssue::InvalidEdit {
                    path: file.path.clone(),
                    error,
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Resolve file paths against the workspace root instead of the plan's directory.
    #[serde(default)]
    pub workspace_relative: bool,
}

/// The ordered edits for one file.
#[derive(Debug, Deserialize, Clone)]
pub struct FilePlan {
    pub path: String,
    #[serde(default)]
    pub edits: Vec<EditOperation>,
}

impl FilePlan {
    /// Whether this plan creates `path` rather than editing it.
    pub fn is_creating(&self) -> bool {
        self.edits
            .first()
            .is_some_and(|edit| edit.old_string.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyFileList,
    MissingField {
        path: Option<String>,
        field: &'static str,
    },
    InvalidEdit {
        path: String,
        error: PatchError,
    },
    InvalidThreshold(f64),
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyFileList => write!(f, "edit plan contains no files"),
            ValidationIssue::MissingField { path, field } => match path {
                Some(path) => write!(f, "file '{path}' missing required field '{field}'"),
                None => write!(f, "file entry missing required field '{field}'"),
            },
            ValidationIssue::InvalidEdit { path, error } => {
                write!(f, "file '{path}' has an invalid edit: {error}")
            }
            ValidationIssue::InvalidThreshold(threshold) => {
                write!(f, "fuzzy threshold {threshold} is outside 0.0..=1.0")
            }
        }
    }
}
