use serde_json::Value;

use crate::Error;

mod draft4;
mod draft6;
mod draft7;
mod subresources;

pub(crate) use subresources::Subresource;

/// JSON Schema specification versions.
#[non_exhaustive]
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub enum Draft {
    /// JSON Schema Draft 4
    Draft4,
    /// JSON Schema Draft 6
    Draft6,
    /// JSON Schema Draft 7
    #[default]
    Draft7,
}

const NUMBER_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern", "format"];
const ARRAY_KEYWORDS_DRAFT4: &[&str] = &[
    "items",
    "additionalItems",
    "minItems",
    "maxItems",
    "uniqueItems",
];
const ARRAY_KEYWORDS: &[&str] = &[
    "items",
    "additionalItems",
    "minItems",
    "maxItems",
    "uniqueItems",
    "contains",
];
const OBJECT_KEYWORDS_DRAFT4: &[&str] = &[
    "properties",
    "required",
    "minProperties",
    "maxProperties",
    "dependencies",
    "patternProperties",
    "additionalProperties",
];
const OBJECT_KEYWORDS: &[&str] = &[
    "properties",
    "required",
    "minProperties",
    "maxProperties",
    "dependencies",
    "patternProperties",
    "additionalProperties",
    "propertyNames",
];

impl Draft {
    /// Detect what specification could be applied to the given contents.
    ///
    /// Returns `self` if `$schema` is absent.
    ///
    /// # Errors
    ///
    /// On unknown `$schema` value it returns [`Error::UnknownSpecification`]
    pub fn detect(self, contents: &Value) -> Result<Draft, Error> {
        let Some(schema) = contents
            .as_object()
            .and_then(|contents| contents.get("$schema"))
            .and_then(Value::as_str)
        else {
            return Ok(self);
        };
        let draft = match schema.trim_end_matches('#') {
            "https://json-schema.org/draft-07/schema"
            | "http://json-schema.org/draft-07/schema" => Draft::Draft7,
            "https://json-schema.org/draft-06/schema"
            | "http://json-schema.org/draft-06/schema" => Draft::Draft6,
            "https://json-schema.org/draft-04/schema"
            | "http://json-schema.org/draft-04/schema" => Draft::Draft4,
            value => return Err(Error::unknown_specification(value)),
        };
        tracing::debug!(schema, ?draft, "Detected specification from `$schema`");
        Ok(draft)
    }

    /// The keyword that declares a schema identifier in this draft.
    #[must_use]
    pub fn id_keyword(self) -> &'static str {
        match self {
            Draft::Draft4 => "id",
            Draft::Draft6 | Draft::Draft7 => "$id",
        }
    }

    /// Identifier declared by the given schema, if any.
    #[must_use]
    pub fn id_of(self, contents: &Value) -> Option<&str> {
        contents
            .as_object()
            .and_then(|schema| schema.get(self.id_keyword()))
            .and_then(Value::as_str)
    }

    /// Whether `true` / `false` are valid schemas.
    #[must_use]
    pub fn supports_boolean_schemas(self) -> bool {
        self >= Draft::Draft6
    }

    #[must_use]
    pub fn supports_const(self) -> bool {
        self >= Draft::Draft6
    }

    #[must_use]
    pub fn supports_contains(self) -> bool {
        self >= Draft::Draft6
    }

    #[must_use]
    pub fn supports_property_names(self) -> bool {
        self >= Draft::Draft6
    }

    /// Whether `if` / `then` / `else` are recognized.
    #[must_use]
    pub fn supports_conditionals(self) -> bool {
        self >= Draft::Draft7
    }

    #[must_use]
    pub fn supports_read_write_only(self) -> bool {
        self >= Draft::Draft7
    }

    /// Whether `exclusiveMinimum` / `exclusiveMaximum` hold numbers rather than boolean flags.
    #[must_use]
    pub fn numeric_exclusive_bounds(self) -> bool {
        self >= Draft::Draft6
    }

    /// Whether keywords next to `$ref` take part in validation.
    #[must_use]
    pub fn merges_ref_siblings(self) -> bool {
        self == Draft::Draft4
    }

    /// Keywords that imply a numeric schema when `type` is absent.
    #[must_use]
    pub fn number_keywords(self) -> &'static [&'static str] {
        NUMBER_KEYWORDS
    }

    /// Keywords that imply a string schema when `type` is absent.
    #[must_use]
    pub fn string_keywords(self) -> &'static [&'static str] {
        STRING_KEYWORDS
    }

    /// Keywords that imply an array schema when `type` is absent.
    #[must_use]
    pub fn array_keywords(self) -> &'static [&'static str] {
        match self {
            Draft::Draft4 => ARRAY_KEYWORDS_DRAFT4,
            Draft::Draft6 | Draft::Draft7 => ARRAY_KEYWORDS,
        }
    }

    /// Keywords that imply an object schema when `type` is absent.
    #[must_use]
    pub fn object_keywords(self) -> &'static [&'static str] {
        match self {
            Draft::Draft4 => OBJECT_KEYWORDS_DRAFT4,
            Draft::Draft6 | Draft::Draft7 => OBJECT_KEYWORDS,
        }
    }

    pub(crate) fn subresources_of(self, contents: &Value) -> Vec<Subresource<'_>> {
        match self {
            Draft::Draft4 => draft4::subresources_of(contents),
            Draft::Draft6 => draft6::subresources_of(contents),
            Draft::Draft7 => draft7::subresources_of(contents),
        }
    }
}
