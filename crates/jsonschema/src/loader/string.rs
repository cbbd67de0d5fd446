use crate::{
    error::SchemaError,
    regex::Pattern,
    schema::{FormatCheck, NodeId, NodeKind, StringSchema},
    value::JsonObject,
};

use super::Context;

pub(super) fn load(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    requires_string: bool,
) -> Result<NodeId, SchemaError> {
    let min_length = object
        .maybe("minLength")
        .map(|value| value.require_non_negative("minLength"))
        .transpose()?;
    let max_length = object
        .maybe("maxLength")
        .map(|value| value.require_non_negative("maxLength"))
        .transpose()?;
    let pattern = match object.maybe("pattern") {
        Some(value) => {
            let pattern = value.require_string()?;
            let compiled = Pattern::compile(pattern, &ctx.config.pattern_options).map_err(
                |message| SchemaError::invalid_regex(value.location().clone(), pattern, message),
            )?;
            Some(compiled)
        }
        None => None,
    };
    let format = match object.maybe("format") {
        Some(value) => {
            let name = value.require_string()?;
            let checker = ctx.config.format(name, ctx.draft);
            if checker.is_none() {
                tracing::debug!(format = name, "Ignoring unknown or disabled format");
            }
            checker.map(|checker| FormatCheck {
                name: name.to_string(),
                checker,
            })
        }
        None => None,
    };
    Ok(ctx.push(NodeKind::String(StringSchema {
        requires_string,
        min_length,
        max_length,
        pattern,
        format,
    })))
}
