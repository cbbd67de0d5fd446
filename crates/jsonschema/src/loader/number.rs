use serde_json::Number;

use crate::{
    cmp,
    error::SchemaError,
    schema::{NodeId, NodeKind, NumberSchema},
    value::JsonObject,
};

use super::Context;

pub(super) fn load(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    requires_number: bool,
    requires_integer: bool,
) -> Result<NodeId, SchemaError> {
    let number = |keyword: &str| -> Result<Option<Number>, SchemaError> {
        object
            .maybe(keyword)
            .map(|value| value.require_number().cloned())
            .transpose()
    };
    let mut minimum = number("minimum")?;
    let mut maximum = number("maximum")?;
    let (exclusive_minimum, exclusive_maximum) = if ctx.draft.numeric_exclusive_bounds() {
        (number("exclusiveMinimum")?, number("exclusiveMaximum")?)
    } else {
        // Boolean flags turning `minimum` / `maximum` into exclusive bounds
        let flag = |keyword: &str| -> Result<bool, SchemaError> {
            object
                .maybe(keyword)
                .map_or(Ok(false), |value| value.require_bool())
        };
        let exclusive_minimum = if flag("exclusiveMinimum")? {
            minimum.take()
        } else {
            None
        };
        let exclusive_maximum = if flag("exclusiveMaximum")? {
            maximum.take()
        } else {
            None
        };
        (exclusive_minimum, exclusive_maximum)
    };
    let multiple_of = match object.maybe("multipleOf") {
        Some(value) => {
            let multiple_of = value.require_number()?;
            let zero = Number::from(0_u8);
            if cmp::compare(multiple_of, &zero) != Some(std::cmp::Ordering::Greater) {
                return Err(SchemaError::invalid_value(
                    value.location().clone(),
                    "multipleOf",
                    format!("{multiple_of} is not strictly greater than 0"),
                ));
            }
            Some(multiple_of.clone())
        }
        None => None,
    };
    Ok(ctx.push(NodeKind::Number(NumberSchema {
        requires_number,
        requires_integer,
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        multiple_of,
    })))
}
