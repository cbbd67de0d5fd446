use std::sync::Arc;

use crate::{
    error::SchemaError,
    paths::Location,
    schema::{CombinedSchema, Criterion, Metadata, NodeId, NodeKind, ReferenceSchema},
    value::JsonObject,
};

use super::{knots::KnotStatus, load_node, load_object, Context};

/// Load a schema object containing `$ref`.
///
/// Draft 4 validates the sibling keywords as well, later drafts ignore them.
pub(super) fn load(ctx: &Context<'_>, object: &JsonObject<'_>) -> Result<NodeId, SchemaError> {
    let value = object.require("$ref")?;
    let reference = reference_node(ctx, value.require_string()?, value.location())?;
    if !ctx.draft.merges_ref_siblings() {
        let mut meta = Metadata::at(ctx.location.clone());
        meta.unprocessed = object.remaining();
        ctx.state.borrow_mut().nodes[reference.0].meta = meta;
        return Ok(reference);
    }
    let siblings = object.project(&["$ref"]);
    if siblings.is_empty() {
        return Ok(reference);
    }
    let constraints = load_object(ctx, &siblings)?;
    Ok(ctx.push(NodeKind::Combined(CombinedSchema {
        criterion: Criterion::All,
        subschemas: vec![reference, constraints],
        synthetic: true,
    })))
}

/// Create a reference node and make sure its target gets loaded exactly once.
fn reference_node(
    ctx: &Context<'_>,
    reference: &str,
    location: &Location,
) -> Result<NodeId, SchemaError> {
    let base = ctx.document.base_at(ctx.location.as_str());
    let resolved = ctx
        .state
        .borrow_mut()
        .registry
        .resolve(&base, reference)
        .map_err(|error| SchemaError::referencing(location.clone(), error))?;
    let key = resolved.canonical();
    let id = ctx.push(NodeKind::Reference(ReferenceSchema {
        reference: reference.to_string(),
        target: None,
    }));

    let status = ctx.state.borrow().knots.status(&key);
    match status {
        KnotStatus::Loaded(target) => ctx.state.borrow_mut().attach(vec![id], target),
        KnotStatus::Pending => ctx.state.borrow_mut().knots.wait(&key, id),
        KnotStatus::Absent => {
            {
                let mut state = ctx.state.borrow_mut();
                state.knots.begin(key.clone());
                state.knots.wait(&key, id);
            }
            let target_ctx = ctx.in_document(Arc::clone(resolved.document()), resolved.pointer());
            let target = load_node(&target_ctx, resolved.contents())?;
            let mut state = ctx.state.borrow_mut();
            let waiting = state.knots.finish(&key, target);
            state.attach(waiting, target);
        }
    }
    Ok(id)
}
