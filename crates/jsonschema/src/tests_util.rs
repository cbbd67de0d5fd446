use serde_json::Value;

use crate::{Draft, Schema, ValidationError};

fn load(schema: &Value) -> Schema {
    crate::load(schema).expect("Invalid schema")
}

fn load_with_draft(draft: Draft, schema: &Value) -> Schema {
    crate::load_with_draft(schema, draft).expect("Invalid schema")
}

#[track_caller]
fn is_not_valid_inner(schema: &Schema, instance: &Value) {
    assert!(
        !schema.is_valid(instance),
        "{instance} should not be valid (via is_valid)",
    );
    assert!(
        schema.validate(instance).is_err(),
        "{instance} should not be valid (via validate)",
    );
    assert!(
        schema.validate_all(instance).is_err(),
        "{instance} should not be valid (via validate_all)",
    );
}

#[track_caller]
pub(crate) fn is_not_valid(schema: &Value, instance: &Value) {
    is_not_valid_inner(&load(schema), instance);
}

#[track_caller]
pub(crate) fn is_not_valid_with_draft(draft: Draft, schema: &Value, instance: &Value) {
    is_not_valid_inner(&load_with_draft(draft, schema), instance);
}

#[track_caller]
fn is_valid_inner(schema: &Schema, instance: &Value) {
    if let Err(error) = schema.validate_all(instance) {
        panic!("{instance} should be valid (via validate_all). Error: {error}");
    }
    assert!(
        schema.is_valid(instance),
        "{instance} should be valid (via is_valid)",
    );
    assert!(
        schema.validate(instance).is_ok(),
        "{instance} should be valid (via validate)",
    );
}

#[track_caller]
pub(crate) fn is_valid(schema: &Value, instance: &Value) {
    is_valid_inner(&load(schema), instance);
}

#[track_caller]
pub(crate) fn is_valid_with_draft(draft: Draft, schema: &Value, instance: &Value) {
    is_valid_inner(&load_with_draft(draft, schema), instance);
}

/// The failure reported in early-fail mode.
#[track_caller]
pub(crate) fn validate_err(schema: &Value, instance: &Value) -> ValidationError<'static> {
    load(schema)
        .validate(instance)
        .expect_err("Should be an error")
        .into_owned()
}

/// The failure tree reported in collecting mode.
#[track_caller]
pub(crate) fn validate_all_err(schema: &Value, instance: &Value) -> ValidationError<'static> {
    load(schema)
        .validate_all(instance)
        .expect_err("Should be an error")
        .into_owned()
}

/// Messages of every leaf violation, in collecting mode.
#[track_caller]
pub(crate) fn expect_errors(schema: &Value, instance: &Value, errors: &[&str]) {
    let error = validate_all_err(schema, instance);
    let messages: Vec<String> = error.leaves().iter().map(|leaf| leaf.to_string()).collect();
    assert_eq!(messages, errors);
}

/// Schema location of the first leaf violation, in early-fail mode.
#[track_caller]
pub(crate) fn assert_schema_location(schema: &Value, instance: &Value, expected: &str) {
    let error = validate_err(schema, instance);
    let leaves = error.leaves();
    assert_eq!(leaves[0].schema_location.as_str(), expected);
}
