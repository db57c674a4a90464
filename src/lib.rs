//! Resilient Patcher: search/replace edits that survive imperfect search text
//!
//! Search strings written by a language model are rarely byte-exact copies of
//! the file: they are re-indented, re-cased, wrapped in blank lines, or typed
//! from memory. This crate locates them anyway, through a fixed cascade of
//! increasingly permissive match strategies, and applies one or more
//! replacements to produce new file content.
//!
//! # Architecture
//!
//! - [`matching`] - the strategy pipeline and [`SearchMatch`] results
//! - [`replace`] - uniqueness checks and splicing for one edit
//! - [`multi_edit`] - ordered edit sequences over one file
//! - [`validate`] - pre-flight checks over untyped tool arguments
//! - [`diff`] - line-level previews of a replacement
//!
//! The core is pure: it takes and returns strings and never touches the file
//! system. [`persist`], [`safety`], and [`config`] are the tool layer the
//! command-line binary is built on.
//!
//! # Safety
//!
//! - Ambiguous single edits are refused, never guessed
//! - Text located only by fuzzy matching is not edited unless
//!   [`FuzzyConfig::allow_edits`] is set
//! - Edit sequences either fully succeed or return an error
//! - Every failure is a typed [`PatchError`] with a closed [`ErrorReason`]
//! - Writes are atomic and refuse to clobber concurrent modifications
//!
//! # Example
//!
//! ```
//! use resilient_patcher::{execute_find_and_replace, find_search_match, StrategyName};
//!
//! let content = "function test() {\n  return true;\n}";
//! let found = find_search_match(content, "function test(){return true;}").unwrap();
//! assert_eq!(found.strategy_name, StrategyName::WhitespaceIgnoredMatch);
//!
//! let updated = execute_find_and_replace(content, "return true;", "return false;", false, None)?;
//! assert_eq!(updated, "function test() {\n  return false;\n}");
//! # Ok::<(), resilient_patcher::PatchError>(())
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod matching;
pub mod multi_edit;
pub mod persist;
pub mod replace;
pub mod safety;
pub mod validate;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, EditPlan, FilePlan};
pub use diff::{generate_search_replace_diff_lines, DiffLine, DiffLineKind, DiffLines};
pub use error::{ErrorReason, PatchError};
pub use matching::{
    find_search_match, find_search_matches, FuzzyConfig, Matcher, MatcherConfig, SearchMatch,
    StrategyName,
};
pub use multi_edit::execute_multi_find_and_replace;
pub use persist::{FileSnapshot, PersistError};
pub use replace::execute_find_and_replace;
pub use safety::{SafetyError, WorkspaceGuard};
pub use validate::{
    validate_creating_for_multi_edit, validate_edit_sequence, validate_multi_edit,
    validate_single_edit, EditOperation, MultiEditArgs,
};
