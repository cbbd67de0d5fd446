use serde_json::Value;

use crate::{
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    schema::{Additional, ObjectSchema},
    types::JsonType,
};

use super::{type_mismatch, Abort, Failures, Validator};

impl Validator<'_, '_> {
    pub(super) fn object<'i>(
        &mut self,
        object: &ObjectSchema,
        schema_location: &Location,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        let Value::Object(map) = instance else {
            if object.requires_object {
                failures.push(type_mismatch(
                    JsonType::Object,
                    schema_location,
                    instance,
                    location,
                ))?;
            }
            return Ok(());
        };
        let error = |kind: ValidationErrorKind| {
            let keyword = kind.keyword();
            ValidationError::new(instance, kind, location.into(), schema_location.join(keyword))
        };
        let size = map.len() as u64;
        if let Some(limit) = object.min_properties {
            if size < limit {
                failures.push(error(ValidationErrorKind::MinProperties { limit }))?;
            }
        }
        if let Some(limit) = object.max_properties {
            if size > limit {
                failures.push(error(ValidationErrorKind::MaxProperties { limit }))?;
            }
        }
        for property in &object.required {
            if !map.contains_key(property) {
                failures.push(error(ValidationErrorKind::Required {
                    property: property.clone(),
                }))?;
            }
        }
        for (name, schema) in &object.properties {
            if let Some(value) = map.get(name) {
                let result = self.validate_node(*schema, value, &location.push(name));
                failures.check(result)?;
            }
        }
        // Every matching pattern applies, independently of `properties`
        let mut unexpected = Vec::new();
        for (name, value) in map {
            let mut matched = object.properties.iter().any(|(known, _)| known == name);
            for (pattern, schema) in &object.pattern_properties {
                if pattern.is_match(name) {
                    matched = true;
                    let result = self.validate_node(*schema, value, &location.push(name));
                    failures.check(result)?;
                }
            }
            if matched {
                continue;
            }
            match object.additional_properties {
                Additional::Allowed => {}
                Additional::Forbidden => unexpected.push(name.clone()),
                Additional::Schema(schema) => {
                    let result = self.validate_node(schema, value, &location.push(name));
                    failures.check(result)?;
                }
            }
        }
        if !unexpected.is_empty() {
            failures.push(error(ValidationErrorKind::AdditionalProperties { unexpected }))?;
        }
        for (property, dependencies) in &object.property_dependencies {
            if !map.contains_key(property) {
                continue;
            }
            for dependency in dependencies {
                if !map.contains_key(dependency) {
                    failures.push(error(ValidationErrorKind::Dependency {
                        property: property.clone(),
                        missing: dependency.clone(),
                    }))?;
                }
            }
        }
        for (property, schema) in &object.schema_dependencies {
            if map.contains_key(property) {
                let result = self.validate_node(*schema, instance, location);
                failures.check(result)?;
            }
        }
        if let Some(names) = object.property_names {
            for name in map.keys() {
                let key = Value::String(name.clone());
                if !self.matches(names, &key, location) {
                    failures.push(error(ValidationErrorKind::PropertyNames {
                        property: name.clone(),
                    }))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use test_case::test_case;

    use crate::{tests_util, ValidationErrorKind};

    #[test_case(&json!({"minProperties": 2}), &json!({"a": 1}), "/minProperties")]
    #[test_case(&json!({"maxProperties": 0}), &json!({"a": 1}), "/maxProperties")]
    #[test_case(&json!({"required": ["a"]}), &json!({}), "/required")]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": 1}), "/properties/a/type")]
    #[test_case(&json!({"patternProperties": {"^x-": {"type": "string"}}}), &json!({"x-a": 1}), "/patternProperties/^x-/type")]
    #[test_case(&json!({"additionalProperties": {"type": "string"}}), &json!({"a": 1}), "/additionalProperties/type")]
    #[test_case(&json!({"dependencies": {"a": ["b"]}}), &json!({"a": 1}), "/dependencies")]
    #[test_case(&json!({"dependencies": {"a": {"required": ["b"]}}}), &json!({"a": 1}), "/dependencies/a/required")]
    #[test_case(&json!({"propertyNames": {"maxLength": 1}}), &json!({"ab": 1}), "/propertyNames")]
    fn test_location(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_location(schema, instance, expected);
    }

    #[test]
    fn test_pattern_properties_are_not_exclusive() {
        let schema = json!({
            "properties": {"foo": {"type": "string"}},
            "patternProperties": {"^f": {"minLength": 5}, "o$": {"maxLength": 3}},
            "additionalProperties": false
        });
        tests_util::is_not_valid(&schema, &json!({"foo": "abc"}));
        tests_util::is_not_valid(&schema, &json!({"foo": "abcdef"}));
        let error = tests_util::validate_all_err(&schema, &json!({"foo": "ab", "bar": 1}));
        let keywords: Vec<_> = error.leaves().iter().map(|leaf| leaf.keyword()).collect();
        assert_eq!(keywords, ["minLength", "additionalProperties"]);
    }

    #[test]
    fn test_unexpected_properties_are_reported_together() {
        let schema = json!({"properties": {"a": {}}, "additionalProperties": false});
        let error = tests_util::validate_all_err(&schema, &json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(
            error.kind,
            ValidationErrorKind::AdditionalProperties {
                unexpected: vec!["b".to_string(), "c".to_string()]
            }
        );
        assert_eq!(
            error.to_string(),
            "Additional properties are not allowed ('b', 'c' were unexpected)"
        );
    }

    #[test]
    fn test_one_error_per_missing_property() {
        let schema = json!({"required": ["a", "b", "c"]});
        let error = tests_util::validate_all_err(&schema, &json!({"b": 1}));
        assert_eq!(error.violation_count(), 2);
        tests_util::expect_errors(
            &schema,
            &json!({"b": 1}),
            &[r#""a" is a required property"#, r#""c" is a required property"#],
        );
    }

    #[test]
    fn test_property_location() {
        let error = tests_util::validate_err(
            &json!({"properties": {"a/b": {"properties": {"c": {"type": "null"}}}}}),
            &json!({"a/b": {"c": 1}}),
        );
        assert_eq!(error.instance_location.as_str(), "/a~1b/c");
        assert_eq!(error.schema_location.as_str(), "/properties/a~1b/properties/c/type");
    }
}
