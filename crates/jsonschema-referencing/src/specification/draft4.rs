use serde_json::Value;

use super::subresources::{self, SubIterBranch, Subresource};

fn object_iter<'a>(key: &'a str, value: &'a Value) -> SubIterBranch<'a> {
    match key {
        // For "items": if it’s an array, iterate over it; otherwise, yield one element.
        "items" => match value {
            Value::Array(arr) => SubIterBranch::Array(arr.iter()),
            _ => SubIterBranch::Once(value),
        },
        "allOf" | "anyOf" | "oneOf" => {
            if let Some(arr) = value.as_array() {
                SubIterBranch::Array(arr.iter())
            } else {
                SubIterBranch::Empty
            }
        }
        "definitions" | "patternProperties" | "properties" => {
            if let Some(obj) = value.as_object() {
                SubIterBranch::Object(obj.iter())
            } else {
                SubIterBranch::Empty
            }
        }
        "dependencies" => {
            if let Some(obj) = value.as_object() {
                SubIterBranch::FilteredObject(obj.iter())
            } else {
                SubIterBranch::Empty
            }
        }
        // Booleans are not schemas in this draft.
        "additionalItems" | "additionalProperties" | "not" if value.is_object() => {
            SubIterBranch::Once(value)
        }
        _ => SubIterBranch::Empty,
    }
}

pub(crate) fn subresources_of(contents: &Value) -> Vec<Subresource<'_>> {
    subresources::collect(contents, object_iter)
}
