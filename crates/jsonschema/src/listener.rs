//! Observation of combinator, conditional and reference boundaries during validation.
//!
//! Listeners do not influence the validation outcome.
use serde_json::Value;

use crate::{
    error::ValidationError,
    paths::Location,
    schema::{Criterion, NodeId},
};

/// A single observation reported to a [`ValidationListener`].
#[derive(Debug, Clone, Copy)]
pub struct ValidationEvent<'a, 'i> {
    pub kind: EventKind<'a, 'i>,
    /// The instance being validated at this boundary.
    pub instance: &'i Value,
    pub instance_location: &'a Location,
    /// Location of the combinator, conditional or reference schema.
    pub schema_location: &'a Location,
}

/// What happened at a boundary.
#[derive(Debug, Clone, Copy)]
pub enum EventKind<'a, 'i> {
    /// The subschema at `index` matched.
    CombinedSchemaMatch { criterion: Criterion, index: usize },
    /// The subschema at `index` did not match.
    CombinedSchemaMismatch {
        criterion: Criterion,
        index: usize,
        failure: &'a ValidationError<'i>,
    },
    /// Validation followed a `$ref` to `target`.
    SchemaReferenced { reference: &'a str, target: NodeId },
    IfSchemaMatch,
    IfSchemaMismatch { failure: &'a ValidationError<'i> },
    ThenSchemaMatch,
    ThenSchemaMismatch { failure: &'a ValidationError<'i> },
    ElseSchemaMatch,
    ElseSchemaMismatch { failure: &'a ValidationError<'i> },
}

/// Receives [`ValidationEvent`]s during [`Schema::validate_traced`](crate::Schema::validate_traced).
///
/// Closures taking `&ValidationEvent` implement this trait:
///
/// ```rust
/// # use serde_json::json;
/// use jsonschema_graph::{EventKind, ValidationConfig};
///
/// let schema = jsonschema_graph::load(&json!({"anyOf": [{"type": "string"}, {"minimum": 3}]}))
///     .expect("Valid schema");
/// let mut matched = Vec::new();
/// let mut listener = |event: &jsonschema_graph::ValidationEvent<'_, '_>| {
///     if let EventKind::CombinedSchemaMatch { index, .. } = event.kind {
///         matched.push(index);
///     }
/// };
/// assert!(schema
///     .validate_traced(&json!(5), &ValidationConfig::default(), &mut listener)
///     .is_ok());
/// assert_eq!(matched, vec![1]);
/// ```
pub trait ValidationListener {
    fn on_event(&mut self, event: &ValidationEvent<'_, '_>);
}

impl<F> ValidationListener for F
where
    F: FnMut(&ValidationEvent<'_, '_>),
{
    fn on_event(&mut self, event: &ValidationEvent<'_, '_>) {
        self(event);
    }
}
