use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::{
    cmp,
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    schema::{NumberSchema, StringSchema},
    types::{is_integer, JsonType},
};

use super::{type_mismatch, Abort, Failures, Validator};

impl Validator<'_, '_> {
    pub(super) fn string<'i>(
        &mut self,
        string: &StringSchema,
        schema_location: &Location,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        let Value::String(item) = instance else {
            if string.requires_string {
                failures.push(type_mismatch(
                    JsonType::String,
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
        if string.min_length.is_some() || string.max_length.is_some() {
            let length = item.chars().count() as u64;
            if let Some(limit) = string.min_length {
                if length < limit {
                    failures.push(error(ValidationErrorKind::MinLength { limit }))?;
                }
            }
            if let Some(limit) = string.max_length {
                if length > limit {
                    failures.push(error(ValidationErrorKind::MaxLength { limit }))?;
                }
            }
        }
        if let Some(pattern) = &string.pattern {
            if !pattern.is_match(item) {
                failures.push(error(ValidationErrorKind::Pattern {
                    pattern: pattern.as_str().to_string(),
                }))?;
            }
        }
        if let Some(format) = &string.format {
            if let Some(message) = format.checker.validate(item) {
                failures.push(error(ValidationErrorKind::Format {
                    format: format.name.clone(),
                    message,
                }))?;
            }
        }
        Ok(())
    }

    pub(super) fn number<'i>(
        &mut self,
        number: &NumberSchema,
        schema_location: &Location,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        let expected = if number.requires_integer {
            JsonType::Integer
        } else {
            JsonType::Number
        };
        let Value::Number(item) = instance else {
            if number.requires_number {
                failures.push(type_mismatch(expected, schema_location, instance, location))?;
            }
            return Ok(());
        };
        if number.requires_integer && !is_integer(item) {
            failures.push(type_mismatch(expected, schema_location, instance, location))?;
        }
        let error = |kind: ValidationErrorKind| {
            let keyword = kind.keyword();
            ValidationError::new(instance, kind, location.into(), schema_location.join(keyword))
        };
        let limit = |limit: &Number| Value::Number(limit.clone());
        if let Some(minimum) = &number.minimum {
            if cmp::compare(item, minimum) == Some(Ordering::Less) {
                failures.push(error(ValidationErrorKind::Minimum {
                    limit: limit(minimum),
                }))?;
            }
        }
        if let Some(maximum) = &number.maximum {
            if cmp::compare(item, maximum) == Some(Ordering::Greater) {
                failures.push(error(ValidationErrorKind::Maximum {
                    limit: limit(maximum),
                }))?;
            }
        }
        if let Some(minimum) = &number.exclusive_minimum {
            if cmp::compare(item, minimum) != Some(Ordering::Greater) {
                failures.push(error(ValidationErrorKind::ExclusiveMinimum {
                    limit: limit(minimum),
                }))?;
            }
        }
        if let Some(maximum) = &number.exclusive_maximum {
            if cmp::compare(item, maximum) != Some(Ordering::Less) {
                failures.push(error(ValidationErrorKind::ExclusiveMaximum {
                    limit: limit(maximum),
                }))?;
            }
        }
        if let Some(multiple_of) = &number.multiple_of {
            if !cmp::is_multiple_of(item, multiple_of) {
                failures.push(error(ValidationErrorKind::MultipleOf {
                    multiple_of: limit(multiple_of),
                }))?;
            }
        }
        Ok(())
    }
}
