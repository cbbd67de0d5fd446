use crate::{
    error::SchemaError,
    schema::{CombinedSchema, Criterion, NodeId, NodeKind, NotSchema},
    value::JsonObject,
};

use super::{load_child, Context};

/// `allOf`, `anyOf`, `oneOf` and `not`. Each present keyword is a separate constraint.
pub(super) fn load(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    parts: &mut Vec<NodeId>,
) -> Result<(), SchemaError> {
    for criterion in [Criterion::All, Criterion::Any, Criterion::One] {
        let keyword = criterion.keyword();
        let Some(value) = object.maybe(keyword) else {
            continue;
        };
        let subschemas = value
            .items()?
            .map(|item| load_child(ctx, &item))
            .collect::<Result<Vec<_>, _>>()?;
        if subschemas.is_empty() {
            return Err(SchemaError::invalid_value(
                value.location().clone(),
                keyword,
                "at least one subschema is required",
            ));
        }
        parts.push(ctx.push(NodeKind::Combined(CombinedSchema {
            criterion,
            subschemas,
            synthetic: false,
        })));
    }
    if let Some(value) = object.maybe("not") {
        let schema = load_child(ctx, &value)?;
        parts.push(ctx.push(NodeKind::Not(NotSchema {
            schema,
            original: value.value().clone(),
        })));
    }
    Ok(())
}
