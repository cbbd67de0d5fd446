use jsonschema_graph::{
    Criterion, Draft, EventKind, NodeKind, ReadWriteContext, SchemaErrorKind, ValidationConfig,
    ValidationErrorKind, ValidationEvent, ValidationMode,
};
use serde_json::{json, Value};
use test_case::test_case;

#[test]
fn test_recursive_properties_resolve_to_one_reference() {
    let schema = jsonschema_graph::load(&json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "child": {"$ref": "#"}
        }
    }))
    .expect("Valid schema");
    let references: Vec<_> = schema
        .nodes()
        .filter_map(|(_, node)| match node.kind() {
            NodeKind::Reference(reference) => Some(reference),
            _ => None,
        })
        .collect();
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].target(), Some(schema.root()));
    assert!(schema.is_valid(&json!({"name": "a", "child": {"name": "b", "child": {}}})));
    let instance = json!({"child": {"child": {"name": 1}}});
    let error = schema.validate(&instance).expect_err("Should fail");
    assert_eq!(error.instance_location.as_str(), "/child/child/name");
    assert_eq!(error.schema_location.as_str(), "/properties/name/type");
}

fn branches() -> Value {
    json!([{"type": "string"}, {"type": "integer"}, {"type": "null"}])
}

#[test]
fn test_combinator_counting() {
    let instance = json!("abc");
    let one_of = jsonschema_graph::load(&json!({"oneOf": branches()})).expect("Valid schema");
    assert!(one_of.is_valid(&instance));

    let all_of = jsonschema_graph::load(&json!({"allOf": branches()})).expect("Valid schema");
    let error = all_of.validate_all(&instance).expect_err("Should fail");
    assert_eq!(error.kind, ValidationErrorKind::AllOf { matched: 1, total: 3 });
    let locations: Vec<_> = error
        .causes
        .iter()
        .map(|cause| cause.schema_location.as_str())
        .collect();
    assert_eq!(locations, ["/allOf/1/type", "/allOf/2/type"]);
}

#[test_case(&json!(5), true)]
#[test_case(&json!("abc"), true)]
#[test_case(&json!("ab"), false)]
#[test_case(&json!(null), true)]
fn test_type_sniffing(instance: &Value, expected: bool) {
    assert_eq!(
        jsonschema_graph::is_valid(&json!({"minLength": 3}), instance),
        expected
    );
}

#[test]
fn test_property_checked_against_properties_and_patterns() {
    let schema = json!({
        "properties": {"size": {"type": "integer"}},
        "patternProperties": {"^s": {"minimum": 0}}
    });
    assert!(jsonschema_graph::is_valid(&schema, &json!({"size": 3})));
    assert!(!jsonschema_graph::is_valid(&schema, &json!({"size": 2.5})));
    assert!(!jsonschema_graph::is_valid(&schema, &json!({"size": -1})));
}

#[test_case(Draft::Draft4, &json!({"minimum": 10, "exclusiveMinimum": true}))]
#[test_case(Draft::Draft6, &json!({"exclusiveMinimum": 10}))]
#[test_case(Draft::Draft7, &json!({"exclusiveMinimum": 10}))]
fn test_exclusive_minimum(draft: Draft, schema: &Value) {
    let schema = jsonschema_graph::load_with_draft(schema, draft).expect("Valid schema");
    assert!(!schema.is_valid(&json!(10)));
    assert!(schema.is_valid(&json!(11)));
}

#[test_case(Draft::Draft6)]
#[test_case(Draft::Draft7)]
fn test_boolean_exclusive_minimum_is_rejected(draft: Draft) {
    let error = jsonschema_graph::load_with_draft(
        &json!({"minimum": 10, "exclusiveMinimum": true}),
        draft,
    )
    .expect_err("Should fail");
    assert!(matches!(error.kind(), SchemaErrorKind::TypeMismatch { .. }));
    assert_eq!(error.location().as_str(), "/exclusiveMinimum");
}

#[test]
fn test_draft_is_detected_from_meta_schema() {
    let schema = jsonschema_graph::load(&json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "maximum": 5,
        "exclusiveMaximum": true
    }))
    .expect("Valid schema");
    assert_eq!(schema.draft(), Draft::Draft4);
    assert!(!schema.is_valid(&json!(5)));
}

#[test_case(&json!({"b": 2, "a": 1}), true)]
#[test_case(&json!({"a": 1.0, "b": 2}), true)]
#[test_case(&json!({"a": 1, "b": 3}), false)]
#[test_case(&json!({"a": 1}), false)]
#[test_case(&json!([{"a": 1, "b": 2}]), false)]
fn test_enum_deep_equality(instance: &Value, expected: bool) {
    assert_eq!(
        jsonschema_graph::is_valid(&json!({"enum": [{"a": 1, "b": 2}]}), instance),
        expected
    );
}

#[test]
fn test_enum_combined_with_type() {
    let schema = json!({"type": "string", "enum": ["a", 1]});
    assert!(jsonschema_graph::is_valid(&schema, &json!("a")));
    assert!(!jsonschema_graph::is_valid(&schema, &json!(1)));
}

#[test]
fn test_early_fail_and_collecting() {
    let schema = jsonschema_graph::load(&json!({
        "properties": {"a": {"type": "string"}, "b": {"type": "string"}}
    }))
    .expect("Valid schema");
    let instance = json!({"a": 1, "b": 2});

    let error = schema.validate(&instance).expect_err("Should fail");
    assert_eq!(error.violation_count(), 1);
    assert_eq!(error.instance_location.as_str(), "/a");

    let error = schema.validate_all(&instance).expect_err("Should fail");
    assert_eq!(error.kind, ValidationErrorKind::Multiple { count: 2 });
    let locations: Vec<_> = error
        .leaves()
        .iter()
        .map(|leaf| leaf.instance_location.as_str().to_string())
        .collect();
    assert_eq!(locations, ["/a", "/b"]);

    let config = ValidationConfig::new(ValidationMode::EarlyFail);
    let error = schema.validate_with(&instance, &config).expect_err("Should fail");
    assert_eq!(error.violation_count(), 1);
}

#[test]
fn test_listener_reports_boundaries() {
    let schema = jsonschema_graph::load(&json!({
        "definitions": {"positive": {"minimum": 0}},
        "if": {"type": "integer"},
        "then": {"$ref": "#/definitions/positive"},
        "else": {"oneOf": [{"type": "string"}, {"type": "null"}]}
    }))
    .expect("Valid schema");

    let mut events = Vec::new();
    let mut listener = |event: &ValidationEvent<'_, '_>| {
        let name = match event.kind {
            EventKind::CombinedSchemaMatch { criterion, index } => {
                format!("{criterion:?} match {index}")
            }
            EventKind::CombinedSchemaMismatch {
                criterion,
                index,
                failure,
            } => format!("{criterion:?} mismatch {index} ({})", failure.keyword()),
            EventKind::SchemaReferenced { reference, .. } => format!("ref {reference}"),
            EventKind::IfSchemaMatch => "if match".to_string(),
            EventKind::IfSchemaMismatch { .. } => "if mismatch".to_string(),
            EventKind::ThenSchemaMatch => "then match".to_string(),
            EventKind::ThenSchemaMismatch { .. } => "then mismatch".to_string(),
            EventKind::ElseSchemaMatch => "else match".to_string(),
            EventKind::ElseSchemaMismatch { .. } => "else mismatch".to_string(),
        };
        events.push(format!("{} {name}", event.schema_location));
    };
    let config = ValidationConfig::default();
    assert!(schema.validate_traced(&json!(-1), &config, &mut listener).is_err());
    assert!(schema.validate_traced(&json!("x"), &config, &mut listener).is_ok());
    assert_eq!(
        events,
        [
            " if match",
            "/then ref #/definitions/positive",
            " then mismatch",
            " if mismatch",
            "/else One match 0",
            "/else One mismatch 1 (type)",
            " else match",
        ]
    );
}

#[test]
fn test_listener_does_not_change_outcome() {
    let schema =
        jsonschema_graph::load(&json!({"anyOf": [{"type": "string"}, {"type": "integer"}]}))
            .expect("Valid schema");
    let mut count = 0;
    let mut listener = |event: &ValidationEvent<'_, '_>| {
        if let EventKind::CombinedSchemaMismatch {
            criterion: Criterion::Any,
            ..
        } = event.kind
        {
            count += 1;
        }
    };
    let config = ValidationConfig::default();
    assert!(schema.validate_traced(&json!(1), &config, &mut listener).is_ok());
    assert!(schema.validate_traced(&json!(1.5), &config, &mut listener).is_err());
    assert_eq!(count, 3);
}

#[test_case(ReadWriteContext::Read, &json!({"password": "x"}), false)]
#[test_case(ReadWriteContext::Read, &json!({"id": 1}), true)]
#[test_case(ReadWriteContext::Write, &json!({"id": 1}), false)]
#[test_case(ReadWriteContext::Write, &json!({"password": "x"}), true)]
fn test_read_write_context(context: ReadWriteContext, instance: &Value, expected: bool) {
    let schema = jsonschema_graph::load(&json!({
        "properties": {
            "id": {"type": "integer", "readOnly": true},
            "password": {"type": "string", "writeOnly": true}
        }
    }))
    .expect("Valid schema");
    let config = ValidationConfig::default().with_read_write_context(context);
    assert_eq!(schema.validate_with(instance, &config).is_ok(), expected);
    // Without a context both keywords are annotations
    assert!(schema.is_valid(instance));
}

#[test]
fn test_read_only_location() {
    let schema = jsonschema_graph::load(&json!({
        "properties": {"id": {"type": "integer", "readOnly": true}}
    }))
    .expect("Valid schema");
    let config = ValidationConfig::default().with_read_write_context(ReadWriteContext::Write);
    let instance = json!({"id": 1});
    let error = schema.validate_with(&instance, &config).expect_err("Should fail");
    assert_eq!(error.kind, ValidationErrorKind::ReadOnly);
    assert_eq!(error.schema_location.as_str(), "/properties/id/readOnly");
    assert_eq!(error.to_string(), "1 is read-only");
}

#[test]
fn test_nullable() {
    let schema = json!({"type": "string", "nullable": true});
    let enabled = jsonschema_graph::options()
        .nullable_support(true)
        .build(&schema)
        .expect("Valid schema");
    assert!(enabled.is_valid(&json!(null)));
    assert!(enabled.is_valid(&json!("a")));
    assert!(!enabled.is_valid(&json!(1)));
    let disabled = jsonschema_graph::load(&schema).expect("Valid schema");
    assert!(!disabled.is_valid(&json!(null)));
}

#[test_case("date-time", "2024-02-29T12:00:00Z", "2024-02-30T12:00:00Z")]
#[test_case("email", "user@example.com", "user@")]
#[test_case("ipv4", "127.0.0.1", "127.0.0.256")]
#[test_case("ipv6", "::1", "::g")]
#[test_case("uri", "https://example.com/a?b=c", "example.com")]
#[test_case("json-pointer", "/a~1b/0", "a/b")]
#[test_case("date", "2023-02-28", "2023-02-29")]
#[test_case("regex", "^[a-z]+$", "[a-")]
fn test_builtin_formats(format: &str, valid: &str, invalid: &str) {
    let schema = json!({"format": format});
    assert!(jsonschema_graph::is_valid(&schema, &json!(valid)));
    let instance = json!(invalid);
    let error = jsonschema_graph::validate(&schema, &instance).expect_err("Should fail");
    assert_eq!(error.to_string(), format!(r#""{invalid}" is not a "{format}""#));
}

#[test]
fn test_formats_by_draft_and_configuration() {
    let schema = json!({"format": "date"});
    // `date` is not defined before draft 7
    assert!(jsonschema_graph::load_with_draft(&schema, Draft::Draft4)
        .expect("Valid schema")
        .is_valid(&json!("not a date")));
    assert!(!jsonschema_graph::is_valid(&schema, &json!("not a date")));
    let unchecked = jsonschema_graph::options()
        .should_validate_formats(false)
        .build(&schema)
        .expect("Valid schema");
    assert!(unchecked.is_valid(&json!("not a date")));
    // Unknown formats are ignored
    assert!(jsonschema_graph::is_valid(&json!({"format": "custom"}), &json!("x")));
}

#[test]
fn test_duration_format_is_opt_in() {
    let schema = json!({"format": "duration"});
    assert!(jsonschema_graph::is_valid(&schema, &json!("P1X")));
    let schema = jsonschema_graph::options()
        .with_format("duration", jsonschema_graph::formats::Duration)
        .build(&schema)
        .expect("Valid schema");
    assert!(schema.is_valid(&json!("P1DT2H")));
    assert!(!schema.is_valid(&json!("P1X")));
}

#[test]
fn test_regex_engine_selection() {
    let schema = json!({"pattern": "^(?!forbidden)"});
    assert!(jsonschema_graph::is_valid(&schema, &json!("allowed")));
    assert!(!jsonschema_graph::is_valid(&schema, &json!("forbidden")));
    let error = jsonschema_graph::options()
        .with_pattern_options(jsonschema_graph::PatternOptions::regex())
        .build(&schema)
        .expect_err("Look-around is not supported by the linear engine");
    assert!(matches!(error.kind(), SchemaErrorKind::InvalidRegex { .. }));
    assert_eq!(error.location().as_str(), "/pattern");
}

#[test]
fn test_defaults() {
    let schema = jsonschema_graph::options()
        .use_defaults(true)
        .build(&json!({"properties": {"port": {"type": "integer", "default": 8080}}}))
        .expect("Valid schema");
    let defaults: Vec<_> = schema
        .nodes()
        .filter_map(|(id, _)| schema.default_value(id))
        .collect();
    assert_eq!(defaults, [&json!(8080)]);
}

#[test]
fn test_custom_retriever() {
    fn retrieve(
        uri: &url::Url,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        match uri.as_str() {
            "https://example.com/person.json" => Ok(json!({
                "type": "object",
                "properties": {"name": {"$ref": "name.json"}},
                "required": ["name"]
            })),
            "https://example.com/name.json" => Ok(json!({"type": "string", "minLength": 1})),
            _ => Err(format!("Unexpected URI {uri}").into()),
        }
    }
    let schema = jsonschema_graph::options()
        .with_retriever(retrieve)
        .build(&json!({"items": {"$ref": "https://example.com/person.json"}}))
        .expect("Valid schema");
    assert!(schema.is_valid(&json!([{"name": "a"}])));
    let instance = json!([{"name": "a"}, {"name": ""}]);
    let error = schema.validate(&instance).expect_err("Should fail");
    assert_eq!(error.instance_location.as_str(), "/1/name");
    assert_eq!(error.schema_location.as_str(), "/minLength");
}
