use crate::{
    error::SchemaError,
    schema::{ConditionalSchema, NodeId, NodeKind},
    value::JsonObject,
};

use super::{load_child, Context};

/// `if` / `then` / `else`, draft 7 only.
///
/// Without `if` the branches can never apply; they are consumed but not loaded.
pub(super) fn load(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    parts: &mut Vec<NodeId>,
) -> Result<(), SchemaError> {
    if !ctx.draft.supports_conditionals() {
        return Ok(());
    }
    let if_ = object.maybe("if");
    let then_ = object.maybe("then");
    let else_ = object.maybe("else");
    let Some(if_) = if_ else {
        return Ok(());
    };
    let if_ = Some(load_child(ctx, &if_)?);
    let then_ = then_.map(|value| load_child(ctx, &value)).transpose()?;
    let else_ = else_.map(|value| load_child(ctx, &value)).transpose()?;
    parts.push(ctx.push(NodeKind::Conditional(ConditionalSchema { if_, then_, else_ })));
    Ok(())
}
