use serde_json::Value;

use crate::{
    error::{ValidationError, ValidationErrorKind},
    listener::EventKind,
    paths::{LazyLocation, Location},
    schema::{CombinedSchema, ConditionalSchema, Criterion, NotSchema},
    types::JsonType,
};

use super::{Abort, Failures, Validator};

impl Validator<'_, '_> {
    pub(super) fn combined<'i>(
        &mut self,
        combined: &CombinedSchema,
        schema_location: &Location,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        let criterion = combined.criterion;
        if combined.synthetic && criterion == Criterion::All {
            // Independent constraints of one schema object report their failures directly
            for subschema in &combined.subschemas {
                let result = self.validate_node(*subschema, instance, location);
                failures.check(result)?;
            }
            return Ok(());
        }
        let total = combined.subschemas.len();
        let mut matched = 0;
        let mut causes = Vec::new();
        for (index, subschema) in combined.subschemas.iter().enumerate() {
            match self.validate_node(*subschema, instance, location) {
                Ok(()) => {
                    matched += 1;
                    self.emit(
                        instance,
                        location,
                        schema_location,
                        EventKind::CombinedSchemaMatch { criterion, index },
                    );
                }
                Err(failure) => {
                    self.emit(
                        instance,
                        location,
                        schema_location,
                        EventKind::CombinedSchemaMismatch {
                            criterion,
                            index,
                            failure: &failure,
                        },
                    );
                    causes.push(failure);
                }
            }
            if self.is_early() {
                let decided = match criterion {
                    Criterion::All => !causes.is_empty(),
                    Criterion::Any => matched > 0,
                    Criterion::One => matched > 1,
                };
                if decided {
                    break;
                }
            }
        }
        let valid = match criterion {
            Criterion::All => causes.is_empty(),
            Criterion::Any => matched > 0,
            Criterion::One => matched == 1,
        };
        if valid {
            return Ok(());
        }
        if combined.synthetic {
            // `"type": [..]`
            if let Some(expected) = merge_types(&causes) {
                return failures.push(ValidationError::new(
                    instance,
                    ValidationErrorKind::Type { expected },
                    location.into(),
                    schema_location.join("type"),
                ));
            }
        }
        let kind = ValidationErrorKind::combined(criterion, matched, total);
        if let ValidationErrorKind::OneOfMultipleValid { .. } = kind {
            causes.clear();
        }
        let keyword = if combined.synthetic {
            "type"
        } else {
            criterion.keyword()
        };
        failures.push(
            ValidationError::new(instance, kind, location.into(), schema_location.join(keyword))
                .with_causes(causes),
        )
    }

    pub(super) fn not<'i>(
        &mut self,
        not: &NotSchema,
        schema_location: &Location,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        if self.matches(not.schema, instance, location) {
            failures.push(ValidationError::new(
                instance,
                ValidationErrorKind::Not {
                    schema: not.original.clone(),
                },
                location.into(),
                schema_location.join("not"),
            ))
        } else {
            Ok(())
        }
    }

    pub(super) fn conditional<'i>(
        &mut self,
        conditional: &ConditionalSchema,
        schema_location: &Location,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        let Some(if_) = conditional.if_ else {
            return Ok(());
        };
        let (branch, is_then) = match self.validate_node(if_, instance, location) {
            Ok(()) => {
                self.emit(instance, location, schema_location, EventKind::IfSchemaMatch);
                (conditional.then_, true)
            }
            Err(failure) => {
                self.emit(
                    instance,
                    location,
                    schema_location,
                    EventKind::IfSchemaMismatch { failure: &failure },
                );
                (conditional.else_, false)
            }
        };
        let Some(branch) = branch else {
            return Ok(());
        };
        match self.validate_node(branch, instance, location) {
            Ok(()) => {
                let kind = if is_then {
                    EventKind::ThenSchemaMatch
                } else {
                    EventKind::ElseSchemaMatch
                };
                self.emit(instance, location, schema_location, kind);
                Ok(())
            }
            Err(failure) => {
                let kind = if is_then {
                    EventKind::ThenSchemaMismatch { failure: &failure }
                } else {
                    EventKind::ElseSchemaMismatch { failure: &failure }
                };
                self.emit(instance, location, schema_location, kind);
                failures.push(failure)
            }
        }
    }
}

/// Expected types of a failed `"type": [..]`, if every branch failed on its type alone.
fn merge_types(causes: &[ValidationError<'_>]) -> Option<Vec<JsonType>> {
    let mut merged = Vec::with_capacity(causes.len());
    for cause in causes {
        let ValidationErrorKind::Type { expected } = &cause.kind else {
            return None;
        };
        merged.extend(expected.iter().copied());
    }
    Some(merged)
}
