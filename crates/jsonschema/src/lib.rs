//! A JSON Schema loader and validator for drafts 4, 6 and 7.
//!
//! Loading turns a schema document into a [`Schema`]: a graph of typed nodes where every
//! `$ref` points at the node of its target. Recursive schemas become cycles in this graph, so
//! a reference is resolved and loaded exactly once.
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = json!({
//!     "definitions": {
//!         "node": {
//!             "type": "object",
//!             "properties": {
//!                 "value": {"type": "integer"},
//!                 "next": {"$ref": "#/definitions/node"}
//!             },
//!             "required": ["value"]
//!         }
//!     },
//!     "$ref": "#/definitions/node"
//! });
//! let schema = jsonschema_graph::load(&schema).expect("Valid schema");
//! assert!(schema.is_valid(&json!({"value": 1, "next": {"value": 2}})));
//! assert!(!schema.is_valid(&json!({"value": 1, "next": {"value": "2"}})));
//! ```
//!
//! # Validation modes
//!
//! [`Schema::validate`] stops at the first violation, [`Schema::validate_all`] gathers every
//! independent violation into a single failure tree:
//!
//! ```rust
//! use serde_json::json;
//!
//! let schema = jsonschema_graph::load(&json!({"type": "string", "minLength": 5, "pattern": "^[0-9]+$"}))
//!     .expect("Valid schema");
//! let instance = json!("ab");
//! let error = schema.validate_all(&instance).expect_err("Invalid instance");
//! assert_eq!(error.violation_count(), 2);
//! let locations: Vec<_> = error
//!     .leaves()
//!     .iter()
//!     .map(|leaf| leaf.schema_location.to_string())
//!     .collect();
//! assert_eq!(locations, ["/minLength", "/pattern"]);
//! ```
//!
//! # Configuration
//!
//! [`options`] returns a [`LoaderOptions`] builder for the draft, custom formats, regular
//! expression engine, reference retrieval and extensions such as `nullable`:
//!
//! ```rust
//! use serde_json::json;
//! use jsonschema_graph::Draft;
//!
//! let schema = jsonschema_graph::options()
//!     .with_draft(Draft::Draft4)
//!     .nullable_support(true)
//!     .build(&json!({"type": "string", "nullable": true}))
//!     .expect("Valid schema");
//! assert!(schema.is_valid(&json!(null)));
//! assert!(!schema.is_valid(&json!(1)));
//! ```
mod cmp;
mod error;
pub mod formats;
mod listener;
mod loader;
mod options;
mod paths;
mod regex;
mod retriever;
mod schema;
#[cfg(test)]
mod tests_util;
mod types;
mod validator;
mod value;

pub use error::{SchemaError, SchemaErrorKind, ValidationError, ValidationErrorKind};
pub use formats::Format;
pub use listener::{EventKind, ValidationEvent, ValidationListener};
pub use options::{LoaderOptions, PatternOptions, ReadWriteContext, ValidationConfig, ValidationMode};
pub use paths::{LazyLocation, Location, LocationSegment};
pub use referencing::{Draft, Retrieve};
pub use retriever::DefaultRetriever;
pub use schema::{
    Additional, ArraySchema, CombinedSchema, ConditionalSchema, Criterion, FormatCheck, Items,
    Metadata, NodeId, NodeKind, NotSchema, NumberSchema, ObjectSchema, ReferenceSchema, Schema,
    SchemaNode, StringSchema,
};
pub use types::JsonType;

use serde_json::Value;

/// Default options for loading a schema.
#[must_use]
pub fn options() -> LoaderOptions {
    LoaderOptions::default()
}

/// Load a schema, detecting the draft from `$schema`.
///
/// # Errors
///
/// Returns an error if the schema is malformed or one of its references cannot be resolved.
pub fn load(schema: &Value) -> Result<Schema, SchemaError> {
    options().build(schema)
}

/// Load a schema under `draft`, regardless of its `$schema`.
///
/// # Errors
///
/// Returns an error if the schema is malformed or one of its references cannot be resolved.
pub fn load_with_draft(schema: &Value, draft: Draft) -> Result<Schema, SchemaError> {
    options().with_draft(draft).build(schema)
}

/// Validate `instance` against `schema`, stopping at the first violation.
///
/// # Panics
///
/// This function panics if the schema is invalid.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate<'i>(schema: &Value, instance: &'i Value) -> Result<(), ValidationError<'i>> {
    load(schema)
        .expect("Invalid schema")
        .validate(instance)
}

/// Whether `instance` is valid under `schema`.
///
/// # Panics
///
/// This function panics if the schema is invalid.
#[must_use]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    load(schema).expect("Invalid schema").is_valid(instance)
}
