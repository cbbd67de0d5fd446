use serde_json::Value;

use crate::{
    error::SchemaError,
    regex::Pattern,
    schema::{Additional, NodeId, NodeKind, ObjectSchema},
    value::JsonObject,
};

use super::{array::additional, load_child, Context};

pub(super) fn load(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    requires_object: bool,
) -> Result<NodeId, SchemaError> {
    let mut properties = Vec::new();
    if let Some(value) = object.maybe("properties") {
        for (name, schema) in value.require_object()?.iter() {
            properties.push((name.to_string(), load_child(ctx, &schema)?));
        }
    }
    let mut pattern_properties = Vec::new();
    if let Some(value) = object.maybe("patternProperties") {
        for (pattern, schema) in value.require_object()?.iter() {
            let compiled = Pattern::compile(pattern, &ctx.config.pattern_options).map_err(
                |message| SchemaError::invalid_regex(schema.location().clone(), pattern, message),
            )?;
            pattern_properties.push((compiled, load_child(ctx, &schema)?));
        }
    }
    let additional_properties = match object.maybe("additionalProperties") {
        Some(value) => additional(ctx, &value)?,
        None => Additional::Allowed,
    };
    let required = object
        .maybe("required")
        .map(|value| value.require_string_array())
        .transpose()?
        .unwrap_or_default();
    let min_properties = object
        .maybe("minProperties")
        .map(|value| value.require_non_negative("minProperties"))
        .transpose()?;
    let max_properties = object
        .maybe("maxProperties")
        .map(|value| value.require_non_negative("maxProperties"))
        .transpose()?;
    let mut property_dependencies = Vec::new();
    let mut schema_dependencies = Vec::new();
    if let Some(value) = object.maybe("dependencies") {
        for (property, dependency) in value.require_object()?.iter() {
            if let Value::Array(_) = dependency.value() {
                property_dependencies
                    .push((property.to_string(), dependency.require_string_array()?));
            } else {
                schema_dependencies.push((property.to_string(), load_child(ctx, &dependency)?));
            }
        }
    }
    let property_names = if ctx.draft.supports_property_names() {
        object
            .maybe("propertyNames")
            .map(|value| load_child(ctx, &value))
            .transpose()?
    } else {
        None
    };
    Ok(ctx.push(NodeKind::Object(ObjectSchema {
        requires_object,
        properties,
        pattern_properties,
        additional_properties,
        required,
        min_properties,
        max_properties,
        property_dependencies,
        schema_dependencies,
        property_names,
    })))
}
