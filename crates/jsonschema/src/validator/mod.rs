//! Evaluation of instances against a loaded [`Schema`].
//!
//! The validator walks the schema graph and the instance together. Every node gathers the
//! failures of its own keywords in [`Failures`]; in early-fail mode the first one aborts the
//! node and is propagated upwards as is.
mod array;
mod combinators;
mod object;
mod scalars;

use serde_json::Value;

use crate::{
    cmp,
    error::{ValidationError, ValidationErrorKind},
    listener::{EventKind, ValidationEvent, ValidationListener},
    options::{ReadWriteContext, ValidationConfig, ValidationMode},
    paths::{LazyLocation, Location},
    schema::{NodeId, NodeKind, Schema, SchemaNode},
    types::JsonType,
};

/// Stops the evaluation of a node once its outcome is known.
#[derive(Debug)]
pub(crate) struct Abort;

/// Failures of a single node.
pub(crate) struct Failures<'i> {
    early: bool,
    errors: Vec<ValidationError<'i>>,
}

impl<'i> Failures<'i> {
    fn new(early: bool) -> Failures<'i> {
        Failures {
            early,
            errors: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, error: ValidationError<'i>) -> Result<(), Abort> {
        self.errors.push(error);
        if self.early {
            Err(Abort)
        } else {
            Ok(())
        }
    }

    pub(crate) fn check(&mut self, result: Result<(), ValidationError<'i>>) -> Result<(), Abort> {
        match result {
            Ok(()) => Ok(()),
            Err(error) => self.push(error),
        }
    }

    /// One failure is reported as is, several are wrapped into a `Multiple` failure.
    ///
    /// A nested `Multiple` stays a single child, so the tree follows the schema.
    fn finish(
        mut self,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        schema_location: &Location,
    ) -> Result<(), ValidationError<'i>> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => {
                let count = self
                    .errors
                    .iter()
                    .map(ValidationError::violation_count)
                    .sum();
                Err(ValidationError::new(
                    instance,
                    ValidationErrorKind::Multiple { count },
                    location.into(),
                    schema_location.clone(),
                )
                .with_causes(self.errors))
            }
        }
    }
}

pub(crate) struct Validator<'s, 'l> {
    schema: &'s Schema,
    config: ValidationConfig,
    listener: Option<&'l mut dyn ValidationListener>,
}

impl<'s, 'l> Validator<'s, 'l> {
    pub(crate) fn new(
        schema: &'s Schema,
        config: ValidationConfig,
        listener: Option<&'l mut dyn ValidationListener>,
    ) -> Validator<'s, 'l> {
        Validator {
            schema,
            config,
            listener,
        }
    }

    pub(crate) fn run<'i>(mut self, instance: &'i Value) -> Result<(), ValidationError<'i>> {
        let location = LazyLocation::new();
        self.validate_node(self.schema.root(), instance, &location)
    }

    fn is_early(&self) -> bool {
        self.config.mode == ValidationMode::EarlyFail
    }

    /// Validate `instance` against the node `id`.
    pub(crate) fn validate_node<'i>(
        &mut self,
        id: NodeId,
        instance: &'i Value,
        location: &LazyLocation<'_>,
    ) -> Result<(), ValidationError<'i>> {
        let schema = self.schema;
        let node = schema.node(id);
        if instance.is_null() && node.meta().is_nullable() {
            return Ok(());
        }
        let mut failures = Failures::new(self.is_early());
        // `Abort` only ends the evaluation of this node, the failure is already recorded
        let _ = self
            .check_read_write(node, instance, location, &mut failures)
            .and_then(|()| self.check_kind(node, instance, location, &mut failures));
        failures.finish(instance, location, node.meta().location())
    }

    /// Whether `instance` matches the node, without keeping the failures.
    pub(crate) fn matches(
        &mut self,
        id: NodeId,
        instance: &Value,
        location: &LazyLocation<'_>,
    ) -> bool {
        let mode = self.config.mode;
        self.config.mode = ValidationMode::EarlyFail;
        let result = self.validate_node(id, instance, location).is_ok();
        self.config.mode = mode;
        result
    }

    fn check_read_write<'i>(
        &mut self,
        node: &SchemaNode,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        let meta = node.meta();
        let kind = match self.config.read_write_context {
            Some(ReadWriteContext::Read) if meta.is_write_only() => ValidationErrorKind::WriteOnly,
            Some(ReadWriteContext::Write) if meta.is_read_only() => ValidationErrorKind::ReadOnly,
            _ => return Ok(()),
        };
        let keyword = kind.keyword();
        failures.push(ValidationError::new(
            instance,
            kind,
            location.into(),
            meta.location().join(keyword),
        ))
    }

    fn check_kind<'i>(
        &mut self,
        node: &SchemaNode,
        instance: &'i Value,
        location: &LazyLocation<'_>,
        failures: &mut Failures<'i>,
    ) -> Result<(), Abort> {
        let schema_location = node.meta().location();
        match node.kind() {
            NodeKind::String(string) => {
                self.string(string, schema_location, instance, location, failures)
            }
            NodeKind::Number(number) => {
                self.number(number, schema_location, instance, location, failures)
            }
            NodeKind::Boolean if !instance.is_boolean() => failures.push(type_mismatch(
                JsonType::Boolean,
                schema_location,
                instance,
                location,
            )),
            NodeKind::Null if !instance.is_null() => failures.push(type_mismatch(
                JsonType::Null,
                schema_location,
                instance,
                location,
            )),
            NodeKind::Array(array) => {
                self.array(array, schema_location, instance, location, failures)
            }
            NodeKind::Object(object) => {
                self.object(object, schema_location, instance, location, failures)
            }
            NodeKind::Combined(combined) => {
                self.combined(combined, schema_location, instance, location, failures)
            }
            NodeKind::Conditional(conditional) => {
                self.conditional(conditional, schema_location, instance, location, failures)
            }
            NodeKind::Not(not) => self.not(not, schema_location, instance, location, failures),
            NodeKind::Enum(options) => {
                if options.iter().any(|option| cmp::equal(option, instance)) {
                    return Ok(());
                }
                failures.push(ValidationError::new(
                    instance,
                    ValidationErrorKind::Enum {
                        options: Value::Array(options.clone()),
                    },
                    location.into(),
                    schema_location.join("enum"),
                ))
            }
            NodeKind::Const(expected) => {
                if cmp::equal(expected, instance) {
                    return Ok(());
                }
                failures.push(ValidationError::new(
                    instance,
                    ValidationErrorKind::Constant {
                        expected_value: expected.clone(),
                    },
                    location.into(),
                    schema_location.join("const"),
                ))
            }
            NodeKind::Reference(reference) => {
                let Some(target) = reference.target() else {
                    panic!(
                        "Reference '{}' at '{schema_location}' is used before it was resolved",
                        reference.reference()
                    );
                };
                self.emit(
                    instance,
                    location,
                    schema_location,
                    EventKind::SchemaReferenced {
                        reference: reference.reference(),
                        target,
                    },
                );
                let result = self.validate_node(target, instance, location);
                failures.check(result)
            }
            NodeKind::Boolean | NodeKind::Null | NodeKind::Empty | NodeKind::True => Ok(()),
            NodeKind::False => failures.push(ValidationError::new(
                instance,
                ValidationErrorKind::FalseSchema,
                location.into(),
                schema_location.clone(),
            )),
        }
    }

    /// Report an event to the listener, if any.
    pub(crate) fn emit(
        &mut self,
        instance: &Value,
        location: &LazyLocation<'_>,
        schema_location: &Location,
        kind: EventKind<'_, '_>,
    ) {
        if let Some(listener) = &mut self.listener {
            let instance_location = Location::from(location);
            listener.on_event(&ValidationEvent {
                kind,
                instance,
                instance_location: &instance_location,
                schema_location,
            });
        }
    }
}

/// A `type` violation reported by the node at `schema_location`.
pub(crate) fn type_mismatch<'i>(
    expected: JsonType,
    schema_location: &Location,
    instance: &'i Value,
    location: &LazyLocation<'_>,
) -> ValidationError<'i> {
    ValidationError::new(
        instance,
        ValidationErrorKind::Type {
            expected: vec![expected],
        },
        location.into(),
        schema_location.join("type"),
    )
}
