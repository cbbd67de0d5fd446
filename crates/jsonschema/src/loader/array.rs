use serde_json::Value;

use crate::{
    error::SchemaError,
    schema::{Additional, ArraySchema, Items, NodeId, NodeKind},
    value::{JsonObject, JsonValue},
};

use super::{load_child, Context};

pub(super) fn load(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    requires_array: bool,
) -> Result<NodeId, SchemaError> {
    let items = match object.maybe("items") {
        Some(value) if value.value().is_array() => Some(Items::Tuple(
            value
                .items()?
                .map(|item| load_child(ctx, &item))
                .collect::<Result<_, _>>()?,
        )),
        Some(value) => Some(Items::All(load_child(ctx, &value)?)),
        None => None,
    };
    let additional_items = match object.maybe("additionalItems") {
        Some(value) => additional(ctx, &value)?,
        None => Additional::Allowed,
    };
    let min_items = object
        .maybe("minItems")
        .map(|value| value.require_non_negative("minItems"))
        .transpose()?;
    let max_items = object
        .maybe("maxItems")
        .map(|value| value.require_non_negative("maxItems"))
        .transpose()?;
    let unique_items = object
        .maybe("uniqueItems")
        .map_or(Ok(false), |value| value.require_bool())?;
    let contains = if ctx.draft.supports_contains() {
        object
            .maybe("contains")
            .map(|value| load_child(ctx, &value))
            .transpose()?
    } else {
        None
    };
    Ok(ctx.push(NodeKind::Array(ArraySchema {
        requires_array,
        items,
        additional_items,
        min_items,
        max_items,
        unique_items,
        contains,
    })))
}

/// `additionalItems` / `additionalProperties`: a boolean gate or a schema.
pub(super) fn additional(
    ctx: &Context<'_>,
    value: &JsonValue<'_>,
) -> Result<Additional, SchemaError> {
    match value.value() {
        Value::Bool(true) => Ok(Additional::Allowed),
        Value::Bool(false) => Ok(Additional::Forbidden),
        _ => Ok(Additional::Schema(load_child(ctx, value)?)),
    }
}
