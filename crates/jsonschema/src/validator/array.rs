use serde_json::Value;

use crate::{
    cmp,
    error::{ValidationError, ValidationErrorKind},
    paths::{LazyLocation, Location},
    schema::{Additional, ArraySchema, Items},
    types::JsonType,
};

use super::{type_mismatch, Abort, Failures, Validator};

impl Validator<'_, '_> {
    pub(super) fn array<'i>(
        &mut self,
        array: &ArraySchema,
        schema_location: &Location,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        let Value::Array(items) = instance else {
            if array.requires_array {
                failures.push(type_mismatch(
                    JsonType::Array,
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
        let length = items.len() as u64;
        if let Some(limit) = array.min_items {
            if length < limit {
                failures.push(error(ValidationErrorKind::MinItems { limit }))?;
            }
        }
        if let Some(limit) = array.max_items {
            if length > limit {
                failures.push(error(ValidationErrorKind::MaxItems { limit }))?;
            }
        }
        if array.unique_items && !cmp::is_unique(items) {
            failures.push(error(ValidationErrorKind::UniqueItems))?;
        }
        match &array.items {
            Some(Items::All(schema)) => {
                for (idx, item) in items.iter().enumerate() {
                    let result = self.validate_node(*schema, item, &location.push(idx));
                    failures.check(result)?;
                }
            }
            Some(Items::Tuple(schemas)) => {
                for (idx, (item, schema)) in items.iter().zip(schemas).enumerate() {
                    let result = self.validate_node(*schema, item, &location.push(idx));
                    failures.check(result)?;
                }
                if items.len() > schemas.len() {
                    match array.additional_items {
                        Additional::Allowed => {}
                        Additional::Forbidden => {
                            failures.push(error(ValidationErrorKind::AdditionalItems {
                                limit: schemas.len(),
                            }))?;
                        }
                        Additional::Schema(schema) => {
                            for (idx, item) in items.iter().enumerate().skip(schemas.len()) {
                                let result =
                                    self.validate_node(schema, item, &location.push(idx));
                                failures.check(result)?;
                            }
                        }
                    }
                }
            }
            // `additionalItems` only applies next to a tuple form of `items`
            None => {}
        }
        if let Some(contains) = array.contains {
            let found = items
                .iter()
                .enumerate()
                .any(|(idx, item)| self.matches(contains, item, &location.push(idx)));
            if !found {
                failures.push(error(ValidationErrorKind::Contains))?;
            }
        }
        Ok(())
    }
}
