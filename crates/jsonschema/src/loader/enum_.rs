use crate::{error::SchemaError, schema::NodeId, schema::NodeKind, value::JsonObject};

use super::Context;

/// `enum` and, from draft 6 on, `const`.
pub(super) fn load(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    parts: &mut Vec<NodeId>,
) -> Result<(), SchemaError> {
    if let Some(value) = object.maybe("enum") {
        let options = value.require_array()?;
        parts.push(ctx.push(NodeKind::Enum(options.to_vec())));
    }
    if ctx.draft.supports_const() {
        if let Some(value) = object.maybe("const") {
            parts.push(ctx.push(NodeKind::Const(value.value().clone())));
        }
    }
    Ok(())
}
