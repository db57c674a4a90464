//! Integration tests for edit sequences and their validation

use resilient_patcher::{
    execute_multi_find_and_replace, validate_creating_for_multi_edit, validate_edit_sequence,
    validate_multi_edit, EditOperation, ErrorReason, PatchError,
};
use serde_json::json;

const ORIGINAL: &str = "Hello world\nThis is a test file\nGoodbye world";

#[test]
fn test_sequence_applies_in_order() {
    let result = execute_multi_find_and_replace(
        ORIGINAL,
        &[
            EditOperation::new("Hello world", "Hi there"),
            EditOperation::new("Goodbye world", "See you later"),
        ],
    )
    .unwrap();
    assert_eq!(result, "Hi there\nThis is a test file\nSee you later");
}

#[test]
fn test_validated_payload_round_trips_into_execution() {
    let args = validate_multi_edit(&json!({
        "edits": [
            { "old_string": "test file", "new_string": "sample file" },
            { "old_string": "world", "new_string": "planet", "replace_all": true }
        ]
    }))
    .unwrap();

    let result = execute_multi_find_and_replace(ORIGINAL, &args.edits).unwrap();
    assert_eq!(result, "Hello planet\nThis is a sample file\nGoodbye planet");
}

#[test]
fn test_later_edit_fails_after_earlier_edit_removed_its_text() {
    let err = execute_multi_find_and_replace(
        ORIGINAL,
        &[
            EditOperation::new("Hello world", "Hi there"),
            EditOperation::new("Hello world", "Hey there"),
        ],
    )
    .unwrap_err();

    assert_eq!(err.reason(), ErrorReason::EditChainInvalid);
    assert_eq!(err.root_reason(), ErrorReason::OldStringNotFound);
    assert_eq!(err.edit_index(), Some(1));

    let message = err.to_string();
    assert!(message.contains("Edit 1 will fail"));
    assert!(message.contains("not found after applying previous edits"));
    assert!(message.contains("Consider reordering edits"));
}

#[test]
fn test_first_edit_failure_mentions_original_file() {
    let err = execute_multi_find_and_replace(
        ORIGINAL,
        &[EditOperation::new("Nonexistent line", "x")],
    )
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Edit 0 will fail"));
    assert!(message.contains("not found in original file"));
    assert!(!message.contains("Consider reordering"));
}

#[test]
fn test_later_edit_missing_from_original_file() {
    let err = execute_multi_find_and_replace(
        ORIGINAL,
        &[
            EditOperation::new("Hello world", "Hi there"),
            EditOperation::new("Nonexistent line", "x"),
        ],
    )
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Edit 1 will fail"));
    assert!(message.contains("not found in original file"));
    assert!(!message.contains("Consider reordering"));
}

#[test]
fn test_stale_rename_fails_the_sequence() {
    let err = execute_multi_find_and_replace(
        "data = get_data()\nprocess(data)\nreturn data",
        &[
            EditOperation::new("data", "user_data").replace_all(true),
            EditOperation::new("process(data)", "process_user_data(user_data)"),
        ],
    )
    .unwrap_err();

    assert_eq!(err.reason(), ErrorReason::EditChainInvalid);
    assert_eq!(err.root_reason(), ErrorReason::OldStringNotFound);
    assert_eq!(err.edit_index(), Some(1));
}

#[test]
fn test_chain_error_exposes_inner_error() {
    let err = execute_multi_find_and_replace(
        "a\na",
        &[EditOperation::new("a", "b")],
    )
    .unwrap_err();

    match err {
        PatchError::EditChainInvalid {
            edit_index,
            found_in_original,
            cause,
        } => {
            assert_eq!(edit_index, 0);
            assert!(found_in_original);
            assert!(matches!(
                *cause,
                PatchError::MultipleOccurrences { count: 2, .. }
            ));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_non_first_empty_old_string_rejected() {
    let err = validate_multi_edit(&json!({
        "edits": [
            { "old_string": "a", "new_string": "b" },
            { "old_string": "", "new_string": "c" }
        ]
    }))
    .unwrap_err();
    assert_eq!(err.reason(), ErrorReason::NonFirstEmptyOldString);
    assert_eq!(err.edit_index(), Some(1));
}

#[test]
fn test_payload_shape_errors() {
    let err = validate_multi_edit(&json!({})).unwrap_err();
    assert_eq!(err.reason(), ErrorReason::EditsArrayRequired);

    let err = validate_multi_edit(&json!({ "edits": "nope" })).unwrap_err();
    assert_eq!(err.reason(), ErrorReason::EditsArrayRequired);

    let err = validate_multi_edit(&json!({ "edits": [] })).unwrap_err();
    assert_eq!(err.reason(), ErrorReason::EditsArrayEmpty);

    let err = validate_multi_edit(&json!({
        "edits": [{ "old_string": "a", "new_string": "b", "replace_all": "yes" }]
    }))
    .unwrap_err();
    assert_eq!(err.reason(), ErrorReason::InvalidReplaceAll);
    assert_eq!(err.edit_index(), Some(0));

    let err = validate_multi_edit(&json!({
        "edits": [{ "old_string": "same", "new_string": "same" }]
    }))
    .unwrap_err();
    assert_eq!(err.reason(), ErrorReason::IdenticalOldAndNewStrings);
}

#[test]
fn test_file_creation_rules() {
    let creating = [EditOperation::new("", "fn main() {}\n")];
    assert_eq!(validate_creating_for_multi_edit(&creating), Ok(true));
    assert_eq!(
        execute_multi_find_and_replace("", &creating).unwrap(),
        "fn main() {}\n"
    );

    let editing = [EditOperation::new("a", "b"), EditOperation::new("c", "d")];
    assert_eq!(validate_creating_for_multi_edit(&editing), Ok(false));

    let err = validate_creating_for_multi_edit(&[
        EditOperation::new("", "new file"),
        EditOperation::new("new", "old"),
    ])
    .unwrap_err();
    assert_eq!(err.reason(), ErrorReason::SubsequentEditsOnNewFile);
}

#[test]
fn test_typed_sequence_validation() {
    assert!(validate_edit_sequence(&[EditOperation::new("a", "b")]).is_ok());
    assert_eq!(
        validate_edit_sequence(&[]).unwrap_err().reason(),
        ErrorReason::EditsArrayEmpty
    );
    assert_eq!(
        validate_edit_sequence(&[EditOperation::new("a", "b"), EditOperation::new("", "c")])
            .unwrap_err()
            .reason(),
        ErrorReason::NonFirstEmptyOldString
    );
}

#[test]
fn test_edit_operation_deserializes_with_default_replace_all() {
    let edit: EditOperation =
        serde_json::from_value(json!({ "old_string": "a", "new_string": "b" })).unwrap();
    assert_eq!(edit, EditOperation::new("a", "b"));
    assert!(!edit.replace_all);
}
