//! Error types
use core::fmt;
use std::borrow::Cow;

use referencing::Draft;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::{
    paths::Location,
    schema::Criterion,
    types::JsonType,
};

/// A schema document that cannot be turned into a validator.
#[derive(Debug)]
pub struct SchemaError {
    location: Location,
    kind: SchemaErrorKind,
}

/// Kinds of schema definition errors.
#[derive(Debug)]
#[non_exhaustive]
pub enum SchemaErrorKind {
    /// A keyword holds a JSON value of the wrong type.
    TypeMismatch {
        expected: &'static str,
        actual: JsonType,
    },
    /// The `type` keyword names a type that does not exist.
    UnknownType { name: String },
    /// A keyword that must be present is absent.
    MissingKeyword { keyword: String },
    /// `true` / `false` used as a schema in a draft without boolean schemas.
    BooleanSchemaUnsupported { draft: Draft },
    /// A pattern the regular expression engine cannot compile.
    InvalidRegex { pattern: String, message: String },
    /// A keyword value of the right type that is still not acceptable, e.g. a negative length.
    InvalidValue {
        keyword: &'static str,
        message: String,
    },
    /// A chain of references that never reaches a schema constraining the instance.
    CircularReference { reference: String },
    /// A `$ref` that cannot be resolved.
    Referencing(referencing::Error),
}

impl SchemaError {
    pub(crate) fn new(location: Location, kind: SchemaErrorKind) -> SchemaError {
        SchemaError { location, kind }
    }

    pub(crate) fn type_mismatch(
        location: Location,
        expected: &'static str,
        actual: &Value,
    ) -> SchemaError {
        SchemaError::new(
            location,
            SchemaErrorKind::TypeMismatch {
                expected,
                actual: JsonType::from(actual),
            },
        )
    }

    pub(crate) fn unknown_type(location: Location, name: impl Into<String>) -> SchemaError {
        SchemaError::new(location, SchemaErrorKind::UnknownType { name: name.into() })
    }

    pub(crate) fn missing_keyword(location: Location, keyword: impl Into<String>) -> SchemaError {
        SchemaError::new(
            location,
            SchemaErrorKind::MissingKeyword {
                keyword: keyword.into(),
            },
        )
    }

    pub(crate) fn boolean_schema_unsupported(location: Location, draft: Draft) -> SchemaError {
        SchemaError::new(location, SchemaErrorKind::BooleanSchemaUnsupported { draft })
    }

    pub(crate) fn invalid_regex(
        location: Location,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> SchemaError {
        SchemaError::new(
            location,
            SchemaErrorKind::InvalidRegex {
                pattern: pattern.into(),
                message: message.into(),
            },
        )
    }

    pub(crate) fn invalid_value(
        location: Location,
        keyword: &'static str,
        message: impl Into<String>,
    ) -> SchemaError {
        SchemaError::new(
            location,
            SchemaErrorKind::InvalidValue {
                keyword,
                message: message.into(),
            },
        )
    }

    pub(crate) fn circular_reference(location: Location, reference: impl Into<String>) -> SchemaError {
        SchemaError::new(
            location,
            SchemaErrorKind::CircularReference {
                reference: reference.into(),
            },
        )
    }

    pub(crate) fn referencing(location: Location, error: referencing::Error) -> SchemaError {
        SchemaError::new(location, SchemaErrorKind::Referencing(error))
    }

    /// JSON Pointer into the schema document where the problem was detected.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn kind(&self) -> &SchemaErrorKind {
        &self.kind
    }
}

impl fmt::Display for SchemaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaErrorKind::TypeMismatch { expected, actual } => {
                write!(f, "Expected {expected}, found {actual}")
            }
            SchemaErrorKind::UnknownType { name } => write!(f, "Unknown type: '{name}'"),
            SchemaErrorKind::MissingKeyword { keyword } => {
                write!(f, "Required keyword '{keyword}' is missing")
            }
            SchemaErrorKind::BooleanSchemaUnsupported { draft } => {
                write!(f, "Boolean schemas are not supported in {draft:?}")
            }
            SchemaErrorKind::InvalidRegex { pattern, message } => {
                write!(f, "Invalid regular expression '{pattern}': {message}")
            }
            SchemaErrorKind::InvalidValue { keyword, message } => {
                write!(f, "Invalid value for '{keyword}': {message}")
            }
            SchemaErrorKind::CircularReference { reference } => {
                write!(f, "Reference '{reference}' never leads to a non-reference schema")
            }
            SchemaErrorKind::Referencing(error) => error.fmt(f),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at '{}'", self.kind, self.location)
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            SchemaErrorKind::Referencing(error) => Some(error),
            _ => None,
        }
    }
}

/// An error that can occur during validation.
///
/// Failures form a tree: combinators keep the failures of their subschemas as `causes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError<'a> {
    /// Value of the property that failed validation.
    pub instance: Cow<'a, Value>,
    /// Type of validation error.
    pub kind: ValidationErrorKind,
    /// Path to the value that failed validation.
    pub instance_location: Location,
    /// Path to the JSON Schema keyword that failed validation.
    pub schema_location: Location,
    /// Failures of nested schemas that led to this one.
    pub causes: Vec<ValidationError<'a>>,
}

/// Kinds of errors that may happen during validation
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
#[non_exhaustive]
pub enum ValidationErrorKind {
    /// The input value doesn't match the expected type(s).
    Type { expected: Vec<JsonType> },
    /// The input value is not one of the allowed options.
    Enum { options: Value },
    /// The input value doesn't match the expected constant.
    Constant { expected_value: Value },
    Minimum { limit: Value },
    Maximum { limit: Value },
    ExclusiveMinimum { limit: Value },
    ExclusiveMaximum { limit: Value },
    MultipleOf { multiple_of: Value },
    MinLength { limit: u64 },
    MaxLength { limit: u64 },
    Pattern { pattern: String },
    /// The input doesn't match the given format.
    Format { format: String, message: String },
    MinItems { limit: u64 },
    MaxItems { limit: u64 },
    UniqueItems,
    /// Items beyond the tuple defined by `items` are not allowed.
    AdditionalItems { limit: usize },
    /// No array item matches the `contains` schema.
    Contains,
    MinProperties { limit: u64 },
    MaxProperties { limit: u64 },
    Required { property: String },
    /// A property listed in `dependencies` is present while one it depends on is missing.
    Dependency { property: String, missing: String },
    AdditionalProperties { unexpected: Vec<String> },
    /// A property name does not match the `propertyNames` schema.
    PropertyNames { property: String },
    /// Everything is invalid for a `false` schema.
    FalseSchema,
    /// Not every subschema matched.
    AllOf { matched: usize, total: usize },
    AnyOf { total: usize },
    /// None of the subschemas matched.
    OneOfNotValid { total: usize },
    /// More than one subschema matched.
    OneOfMultipleValid { matched: usize, total: usize },
    /// The instance matches a schema it must not match.
    Not { schema: Value },
    ReadOnly,
    WriteOnly,
    /// Several independent violations of the same schema.
    Multiple { count: usize },
}

impl ValidationErrorKind {
    /// Keyword that caused the failure.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            ValidationErrorKind::Type { .. } => "type",
            ValidationErrorKind::Enum { .. } => "enum",
            ValidationErrorKind::Constant { .. } => "const",
            ValidationErrorKind::Minimum { .. } => "minimum",
            ValidationErrorKind::Maximum { .. } => "maximum",
            ValidationErrorKind::ExclusiveMinimum { .. } => "exclusiveMinimum",
            ValidationErrorKind::ExclusiveMaximum { .. } => "exclusiveMaximum",
            ValidationErrorKind::MultipleOf { .. } => "multipleOf",
            ValidationErrorKind::MinLength { .. } => "minLength",
            ValidationErrorKind::MaxLength { .. } => "maxLength",
            ValidationErrorKind::Pattern { .. } => "pattern",
            ValidationErrorKind::Format { .. } => "format",
            ValidationErrorKind::MinItems { .. } => "minItems",
            ValidationErrorKind::MaxItems { .. } => "maxItems",
            ValidationErrorKind::UniqueItems => "uniqueItems",
            ValidationErrorKind::AdditionalItems { .. } => "additionalItems",
            ValidationErrorKind::Contains => "contains",
            ValidationErrorKind::MinProperties { .. } => "minProperties",
            ValidationErrorKind::MaxProperties { .. } => "maxProperties",
            ValidationErrorKind::Required { .. } => "required",
            ValidationErrorKind::Dependency { .. } => "dependencies",
            ValidationErrorKind::AdditionalProperties { .. } => "additionalProperties",
            ValidationErrorKind::PropertyNames { .. } => "propertyNames",
            ValidationErrorKind::FalseSchema => "false",
            ValidationErrorKind::AllOf { .. } => "allOf",
            ValidationErrorKind::AnyOf { .. } => "anyOf",
            ValidationErrorKind::OneOfNotValid { .. }
            | ValidationErrorKind::OneOfMultipleValid { .. } => "oneOf",
            ValidationErrorKind::Not { .. } => "not",
            ValidationErrorKind::ReadOnly => "readOnly",
            ValidationErrorKind::WriteOnly => "writeOnly",
            ValidationErrorKind::Multiple { .. } => "#",
        }
    }

    pub(crate) fn combined(criterion: Criterion, matched: usize, total: usize) -> Self {
        match criterion {
            Criterion::All => ValidationErrorKind::AllOf { matched, total },
            Criterion::Any => ValidationErrorKind::AnyOf { total },
            Criterion::One if matched == 0 => ValidationErrorKind::OneOfNotValid { total },
            Criterion::One => ValidationErrorKind::OneOfMultipleValid { matched, total },
        }
    }
}

impl<'a> ValidationError<'a> {
    pub(crate) fn new(
        instance: &'a Value,
        kind: ValidationErrorKind,
        instance_location: Location,
        schema_location: Location,
    ) -> ValidationError<'a> {
        ValidationError {
            instance: Cow::Borrowed(instance),
            kind,
            instance_location,
            schema_location,
            causes: Vec::new(),
        }
    }

    pub(crate) fn with_causes(mut self, causes: Vec<ValidationError<'a>>) -> ValidationError<'a> {
        self.causes = causes;
        self
    }

    /// Keyword that caused the failure.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        self.kind.keyword()
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Number of leaf violations in this failure tree.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        if self.causes.is_empty() {
            1
        } else {
            self.causes.iter().map(ValidationError::violation_count).sum()
        }
    }

    /// Failures without causes, in depth-first order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&ValidationError<'a>> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(error) = stack.pop() {
            if error.causes.is_empty() {
                leaves.push(error);
            } else {
                stack.extend(error.causes.iter().rev());
            }
        }
        leaves
    }

    /// JSON representation of the failure tree.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let causes: Vec<Value> = self.causes.iter().map(ValidationError::to_json).collect();
        serde_json::json!({
            "keyword": self.keyword(),
            "keywordLocation": self.schema_location.as_str(),
            "instanceLocation": self.instance_location.as_str(),
            "error": self.to_string(),
            "causes": causes,
        })
    }

    /// Detach the failure from the validated instance.
    #[must_use]
    pub fn into_owned(self) -> ValidationError<'static> {
        ValidationError {
            instance: Cow::Owned(self.instance.into_owned()),
            kind: self.kind,
            instance_location: self.instance_location,
            schema_location: self.schema_location,
            causes: self
                .causes
                .into_iter()
                .map(ValidationError::into_owned)
                .collect(),
        }
    }
}

impl Serialize for ValidationError<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("keyword", self.keyword())?;
        map.serialize_entry("keywordLocation", &self.schema_location)?;
        map.serialize_entry("instanceLocation", &self.instance_location)?;
        map.serialize_entry("error", &self.to_string())?;
        map.serialize_entry("causes", &self.causes)?;
        map.end()
    }
}

impl std::error::Error for ValidationError<'_> {}

fn plural(count: u64, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Textual representation of various validation errors.
impl fmt::Display for ValidationError<'_> {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let instance = &self.instance;
        match &self.kind {
            ValidationErrorKind::Type { expected } => {
                if let [single] = expected.as_slice() {
                    write!(f, r#"{instance} is not of type "{single}""#)
                } else {
                    write!(f, "{instance} is not of types ")?;
                    let mut iter = expected.iter();
                    if let Some(first) = iter.next() {
                        write!(f, r#""{first}""#)?;
                    }
                    for ty in iter {
                        write!(f, r#", "{ty}""#)?;
                    }
                    Ok(())
                }
            }
            ValidationErrorKind::Enum { options } => write!(f, "{instance} is not one of {options}"),
            ValidationErrorKind::Constant { expected_value } => {
                write!(f, "{expected_value} was expected")
            }
            ValidationErrorKind::Minimum { limit } => {
                write!(f, "{instance} is less than the minimum of {limit}")
            }
            ValidationErrorKind::Maximum { limit } => {
                write!(f, "{instance} is greater than the maximum of {limit}")
            }
            ValidationErrorKind::ExclusiveMinimum { limit } => {
                write!(f, "{instance} is less than or equal to the minimum of {limit}")
            }
            ValidationErrorKind::ExclusiveMaximum { limit } => {
                write!(f, "{instance} is greater than or equal to the maximum of {limit}")
            }
            ValidationErrorKind::MultipleOf { multiple_of } => {
                write!(f, "{instance} is not a multiple of {multiple_of}")
            }
            ValidationErrorKind::MinLength { limit } => write!(
                f,
                "{instance} is shorter than {limit} {}",
                plural(*limit, "character", "characters")
            ),
            ValidationErrorKind::MaxLength { limit } => write!(
                f,
                "{instance} is longer than {limit} {}",
                plural(*limit, "character", "characters")
            ),
            ValidationErrorKind::Pattern { pattern } => {
                write!(f, r#"{instance} does not match "{pattern}""#)
            }
            ValidationErrorKind::Format { format, .. } => {
                write!(f, r#"{instance} is not a "{format}""#)
            }
            ValidationErrorKind::MinItems { limit } => write!(
                f,
                "{instance} has less than {limit} {}",
                plural(*limit, "item", "items")
            ),
            ValidationErrorKind::MaxItems { limit } => write!(
                f,
                "{instance} has more than {limit} {}",
                plural(*limit, "item", "items")
            ),
            ValidationErrorKind::UniqueItems => write!(f, "{instance} has non-unique elements"),
            ValidationErrorKind::AdditionalItems { limit } => {
                let extras: Vec<String> = instance
                    .as_array()
                    .map(|items| items.iter().skip(*limit).map(Value::to_string).collect())
                    .unwrap_or_default();
                let verb = if extras.len() == 1 { "was" } else { "were" };
                write!(
                    f,
                    "Additional items are not allowed ({} {verb} unexpected)",
                    extras.join(", ")
                )
            }
            ValidationErrorKind::Contains => write!(
                f,
                "None of {instance} are valid under the given schema"
            ),
            ValidationErrorKind::MinProperties { limit } => write!(
                f,
                "{instance} has less than {limit} {}",
                plural(*limit, "property", "properties")
            ),
            ValidationErrorKind::MaxProperties { limit } => write!(
                f,
                "{instance} has more than {limit} {}",
                plural(*limit, "property", "properties")
            ),
            ValidationErrorKind::Required { property } => {
                write!(f, r#""{property}" is a required property"#)
            }
            ValidationErrorKind::Dependency { property, missing } => {
                write!(f, r#""{missing}" is a dependency of "{property}""#)
            }
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                let verb = if unexpected.len() == 1 { "was" } else { "were" };
                let quoted: Vec<String> = unexpected.iter().map(|p| format!("'{p}'")).collect();
                write!(
                    f,
                    "Additional properties are not allowed ({} {verb} unexpected)",
                    quoted.join(", ")
                )
            }
            ValidationErrorKind::PropertyNames { property } => {
                write!(f, r#"Property name "{property}" is not valid"#)
            }
            ValidationErrorKind::FalseSchema => write!(f, "False schema does not allow {instance}"),
            ValidationErrorKind::AllOf { matched, total } => write!(
                f,
                "{instance} is not valid under all of the schemas listed in the 'allOf' keyword ({matched} of {total} matched)"
            ),
            ValidationErrorKind::AnyOf { total } => write!(
                f,
                "{instance} is not valid under any of the schemas listed in the 'anyOf' keyword (0 of {total} matched)"
            ),
            ValidationErrorKind::OneOfNotValid { total } => write!(
                f,
                "{instance} is not valid under any of the schemas listed in the 'oneOf' keyword (0 of {total} matched)"
            ),
            ValidationErrorKind::OneOfMultipleValid { matched, total } => write!(
                f,
                "{instance} is valid under more than one of the schemas listed in the 'oneOf' keyword ({matched} of {total} matched)"
            ),
            ValidationErrorKind::Not { schema } => write!(f, "{schema} is not allowed for {instance}"),
            ValidationErrorKind::ReadOnly => write!(f, "{instance} is read-only"),
            ValidationErrorKind::WriteOnly => write!(f, "{instance} is write-only"),
            ValidationErrorKind::Multiple { count } => write!(f, "{count} schema violations found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    fn error(instance: &Value, kind: ValidationErrorKind) -> ValidationError<'_> {
        ValidationError::new(instance, kind, Location::new(), Location::new())
    }

    #[test_case(&json!("some string"), ValidationErrorKind::Type { expected: vec![JsonType::Array] }, r#""some string" is not of type "array""#)]
    #[test_case(&json!(1), ValidationErrorKind::Type { expected: vec![JsonType::String, JsonType::Null] }, r#"1 is not of types "string", "null""#)]
    #[test_case(&json!("some string"), ValidationErrorKind::MaxLength { limit: 4 }, r#""some string" is longer than 4 characters"#)]
    #[test_case(&json!(""), ValidationErrorKind::MinLength { limit: 1 }, r#""" is shorter than 1 character"#)]
    #[test_case(&json!({"a": 1}), ValidationErrorKind::AdditionalProperties { unexpected: vec!["a".into()] }, "Additional properties are not allowed ('a' was unexpected)")]
    #[test_case(&json!([1, 2, 3]), ValidationErrorKind::AdditionalItems { limit: 1 }, "Additional items are not allowed (2, 3 were unexpected)")]
    #[test_case(&json!(5), ValidationErrorKind::AllOf { matched: 1, total: 3 }, "5 is not valid under all of the schemas listed in the 'allOf' keyword (1 of 3 matched)")]
    #[test_case(&json!({}), ValidationErrorKind::Required { property: "name".into() }, r#""name" is a required property"#)]
    #[test_case(&json!(10), ValidationErrorKind::ExclusiveMinimum { limit: json!(10) }, "10 is less than or equal to the minimum of 10")]
    fn test_display(instance: &Value, kind: ValidationErrorKind, expected: &str) {
        assert_eq!(error(instance, kind).to_string(), expected);
    }

    #[test]
    fn test_violation_count_and_leaves() {
        let instance = json!({"a": "x", "b": 1});
        let tree = error(&instance, ValidationErrorKind::Multiple { count: 2 }).with_causes(vec![
            error(&instance, ValidationErrorKind::MinProperties { limit: 3 }),
            error(&instance, ValidationErrorKind::AllOf { matched: 0, total: 2 }).with_causes(vec![
                error(&instance, ValidationErrorKind::Required { property: "c".into() }),
                error(&instance, ValidationErrorKind::Required { property: "d".into() }),
            ]),
        ]);
        assert_eq!(tree.violation_count(), 3);
        let keywords: Vec<_> = tree.leaves().iter().map(|leaf| leaf.keyword()).collect();
        assert_eq!(keywords, ["minProperties", "required", "required"]);
    }

    #[test]
    fn test_serialization() {
        let instance = json!(5);
        let failure = ValidationError::new(
            &instance,
            ValidationErrorKind::Minimum { limit: json!(10) },
            Location::new().join("age"),
            Location::new().join("properties").join("age").join("minimum"),
        );
        let expected = json!({
            "keyword": "minimum",
            "keywordLocation": "/properties/age/minimum",
            "instanceLocation": "/age",
            "error": "5 is less than the minimum of 10",
            "causes": []
        });
        assert_eq!(serde_json::to_value(&failure).expect("Serializable"), expected);
        assert_eq!(failure.to_json(), expected);
    }

    #[test]
    fn test_into_owned() {
        let owned = {
            let instance = json!("abc");
            error(&instance, ValidationErrorKind::MinLength { limit: 5 }).into_owned()
        };
        assert_eq!(owned.instance.as_ref(), &json!("abc"));
    }

    #[test]
    fn test_schema_error_display() {
        let error = SchemaError::unknown_type(Location::new().join("type"), "any");
        assert_eq!(error.to_string(), "Unknown type: 'any' at '/type'");
    }
}
