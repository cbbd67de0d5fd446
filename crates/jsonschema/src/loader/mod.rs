//! Turning schema documents into a graph of [`SchemaNode`]s.
//!
//! Loading is a recursive descent over the document. A schema object is split into
//! independent constraints (`enum`, `const`, combinators, conditionals, type-specific
//! keywords); a single constraint becomes the node for the object, several are joined by a
//! synthetic `allOf`.
mod array;
mod combinators;
mod conditional;
mod cycles;
mod enum_;
mod knots;
mod number;
mod object;
mod reference;
mod string;

use std::{cell::RefCell, sync::Arc};

use referencing::{uri, Document, Draft, Registry};
use serde_json::Value;

use crate::{
    error::SchemaError,
    options::LoaderOptions,
    paths::Location,
    schema::{Criterion, CombinedSchema, Metadata, NodeId, NodeKind, Schema, SchemaNode},
    types::JsonType,
    value::{JsonObject, JsonValue},
};
use knots::KnotTable;

/// Keywords that are recognized but carry no validation semantics.
const ANNOTATIONS: &[&str] = &["$schema", "$comment", "definitions", "examples"];

/// Mutable state shared by every [`Context`] of a single load.
pub(crate) struct LoadState {
    nodes: Vec<SchemaNode>,
    registry: Registry,
    knots: KnotTable,
}

impl LoadState {
    fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Point every reference in `references` at `target`.
    fn attach(&mut self, references: Vec<NodeId>, target: NodeId) {
        for reference in references {
            tracing::trace!(
                reference = reference.index(),
                target = target.index(),
                "Attaching reference"
            );
            self.nodes[reference.0].set_target(target);
        }
    }
}

/// Where the loader currently is.
///
/// Child contexts are derived by value; the parent is never modified.
#[derive(Clone)]
pub(crate) struct Context<'a> {
    config: &'a LoaderOptions,
    state: &'a RefCell<LoadState>,
    document: Arc<Document>,
    location: Location,
    draft: Draft,
}

impl<'a> Context<'a> {
    fn new(
        config: &'a LoaderOptions,
        state: &'a RefCell<LoadState>,
        document: Arc<Document>,
        location: Location,
    ) -> Context<'a> {
        let draft = document.draft();
        Context {
            config,
            state,
            document,
            location,
            draft,
        }
    }

    /// Context for the schema at `pointer` inside `document`.
    pub(crate) fn in_document(&self, document: Arc<Document>, pointer: &str) -> Context<'a> {
        Context::new(
            self.config,
            self.state,
            document,
            Location::from_pointer(pointer),
        )
    }

    pub(crate) fn push(&self, kind: NodeKind) -> NodeId {
        self.push_with(Metadata::at(self.location.clone()), kind)
    }

    pub(crate) fn push_with(&self, meta: Metadata, kind: NodeKind) -> NodeId {
        self.state.borrow_mut().push(SchemaNode::new(meta, kind))
    }
}

/// Load `schema` as the root document.
pub(crate) fn load(config: &LoaderOptions, schema: &Value) -> Result<Schema, SchemaError> {
    let draft = match config.draft {
        Some(draft) => draft,
        None => Draft::default()
            .detect(schema)
            .map_err(|error| SchemaError::referencing(Location::new().join("$schema"), error))?,
    };
    let root_uri = match &config.base_uri {
        Some(base_uri) => uri::from_str(base_uri),
        None => Ok(uri::default_root()),
    }
    .map_err(|error| SchemaError::referencing(Location::new(), error))?;
    let mut registry = Registry::new(config.draft.unwrap_or_default())
        .with_retriever(Arc::clone(&config.retriever));
    let document = registry
        .try_add_with_draft(root_uri, schema.clone(), draft)
        .map_err(|error| SchemaError::referencing(Location::new(), error))?;
    tracing::debug!(uri = document.uri().as_str(), ?draft, "Loading schema");

    let state = RefCell::new(LoadState {
        nodes: Vec::new(),
        registry,
        knots: KnotTable::default(),
    });
    let ctx = Context::new(config, &state, Arc::clone(&document), Location::new());
    // References back to the root wait on this knot
    let key = format!("{}#", document.uri());
    state.borrow_mut().knots.begin(key.clone());
    let root = load_node(&ctx, document.contents())?;
    {
        let mut state = state.borrow_mut();
        let waiting = state.knots.finish(&key, root);
        state.attach(waiting, root);
    }

    let LoadState { nodes, knots, .. } = state.into_inner();
    debug_assert!(knots.is_settled());
    cycles::check(&nodes)?;
    tracing::debug!(nodes = nodes.len(), "Schema loaded");
    Ok(Schema::new(nodes, root, draft))
}

/// Load any schema value: a boolean or an object.
pub(crate) fn load_node(ctx: &Context<'_>, value: &Value) -> Result<NodeId, SchemaError> {
    match value {
        Value::Bool(flag) => {
            if !ctx.draft.supports_boolean_schemas() {
                return Err(SchemaError::boolean_schema_unsupported(
                    ctx.location.clone(),
                    ctx.draft,
                ));
            }
            Ok(ctx.push(if *flag { NodeKind::True } else { NodeKind::False }))
        }
        Value::Object(map) => load_object(ctx, &JsonObject::new(map, ctx.location.clone())),
        _ => {
            let expected = if ctx.draft.supports_boolean_schemas() {
                "object or boolean"
            } else {
                "object"
            };
            Err(SchemaError::type_mismatch(
                ctx.location.clone(),
                expected,
                value,
            ))
        }
    }
}

/// Load the schema stored under `keyword` of the current object.
pub(crate) fn load_child(ctx: &Context<'_>, value: &JsonValue<'_>) -> Result<NodeId, SchemaError> {
    let child = Context {
        location: value.location().clone(),
        ..ctx.clone()
    };
    load_node(&child, value.value())
}

/// Load a schema object into one node.
///
/// Each keyword family yields its own constraint: `enum` / `const`, every combinator,
/// `if` / `then` / `else` and the typed keywords. Several constraints are joined into a
/// synthetic `allOf`, so `{"type": "string", "enum": [1]}` requires both and matches nothing.
pub(crate) fn load_object(ctx: &Context<'_>, object: &JsonObject<'_>) -> Result<NodeId, SchemaError> {
    if object.is_empty() {
        return Ok(ctx.push(NodeKind::Empty));
    }
    if object.contains("$ref") {
        return reference::load(ctx, object);
    }
    let mut parts = Vec::new();
    enum_::load(ctx, object, &mut parts)?;
    combinators::load(ctx, object, &mut parts)?;
    conditional::load(ctx, object, &mut parts)?;
    load_typed(ctx, object, &mut parts)?;
    let meta = metadata(ctx, object)?;
    Ok(assemble(ctx, parts, meta))
}

/// Join the constraints of a single schema object into one node carrying `meta`.
fn assemble(ctx: &Context<'_>, parts: Vec<NodeId>, meta: Metadata) -> NodeId {
    match parts.as_slice() {
        [] => ctx.push_with(meta, NodeKind::Empty),
        [single] => {
            ctx.state.borrow_mut().nodes[single.0].meta = meta;
            *single
        }
        _ => ctx.push_with(
            meta,
            NodeKind::Combined(CombinedSchema {
                criterion: Criterion::All,
                subschemas: parts,
                synthetic: true,
            }),
        ),
    }
}

/// `type`, or the types implied by the keywords present when it is absent.
fn load_typed(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    parts: &mut Vec<NodeId>,
) -> Result<(), SchemaError> {
    let Some(value) = object.maybe("type") else {
        return sniff(ctx, object, parts);
    };
    match value.value() {
        Value::String(name) => {
            let ty = parse_type(name, value.location())?;
            parts.push(load_for_type(ctx, object, ty, true)?);
        }
        Value::Array(_) => {
            let mut types = Vec::new();
            for item in value.items()? {
                let ty = parse_type(item.require_string()?, item.location())?;
                if !types.contains(&ty) {
                    types.push(ty);
                }
            }
            let subschemas = types
                .into_iter()
                .map(|ty| load_for_type(ctx, object, ty, true))
                .collect::<Result<Vec<_>, _>>()?;
            if let [single] = subschemas.as_slice() {
                parts.push(*single);
            } else {
                parts.push(ctx.push(NodeKind::Combined(CombinedSchema {
                    criterion: Criterion::Any,
                    subschemas,
                    synthetic: true,
                })));
            }
        }
        other => {
            return Err(SchemaError::type_mismatch(
                value.location().clone(),
                "string or array",
                other,
            ))
        }
    }
    Ok(())
}

fn parse_type(name: &str, location: &Location) -> Result<JsonType, SchemaError> {
    JsonType::from_name(name).ok_or_else(|| SchemaError::unknown_type(location.clone(), name))
}

fn load_for_type(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    ty: JsonType,
    required: bool,
) -> Result<NodeId, SchemaError> {
    match ty {
        JsonType::String => string::load(ctx, object, required),
        JsonType::Number => number::load(ctx, object, required, false),
        JsonType::Integer => number::load(ctx, object, required, true),
        JsonType::Array => array::load(ctx, object, required),
        JsonType::Object => object::load(ctx, object, required),
        JsonType::Boolean => Ok(ctx.push(NodeKind::Boolean)),
        JsonType::Null => Ok(ctx.push(NodeKind::Null)),
    }
}

/// Relaxed type-specific nodes for whichever keyword families are present.
fn sniff(
    ctx: &Context<'_>,
    object: &JsonObject<'_>,
    parts: &mut Vec<NodeId>,
) -> Result<(), SchemaError> {
    let draft = ctx.draft;
    let families = [
        (draft.string_keywords(), JsonType::String),
        (draft.number_keywords(), JsonType::Number),
        (draft.array_keywords(), JsonType::Array),
        (draft.object_keywords(), JsonType::Object),
    ];
    for (keywords, ty) in families {
        if keywords.iter().any(|keyword| object.contains(keyword)) {
            parts.push(load_for_type(ctx, object, ty, false)?);
        }
    }
    Ok(())
}

/// Attributes shared by every node kind, plus the keywords nothing else consumed.
fn metadata(ctx: &Context<'_>, object: &JsonObject<'_>) -> Result<Metadata, SchemaError> {
    let mut meta = Metadata::at(ctx.location.clone());
    if let Some(id) = object.maybe(ctx.draft.id_keyword()) {
        meta.id = Some(id.require_string()?.to_string());
    }
    if let Some(title) = object.maybe("title") {
        meta.title = Some(title.require_string()?.to_string());
    }
    if let Some(description) = object.maybe("description") {
        meta.description = Some(description.require_string()?.to_string());
    }
    if ctx.draft.supports_read_write_only() {
        if let Some(read_only) = object.maybe("readOnly") {
            meta.read_only = read_only.require_bool()?;
        }
        if let Some(write_only) = object.maybe("writeOnly") {
            meta.write_only = write_only.require_bool()?;
        }
    }
    if ctx.config.nullable {
        if let Some(nullable) = object.maybe("nullable") {
            meta.nullable = nullable.require_bool()?;
        }
    }
    if let Some(default) = object.maybe("default") {
        if ctx.config.defaults {
            meta.default = Some(default.value().clone());
        }
    }
    for keyword in ANNOTATIONS {
        object.maybe(keyword);
    }
    meta.unprocessed = object.remaining();
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::SchemaErrorKind, schema::Items};
    use serde_json::json;
    use test_case::test_case;

    fn load_default(schema: &Value) -> Schema {
        crate::options().build(schema).expect("Valid schema")
    }

    fn root_kind(schema: &Schema) -> &NodeKind {
        schema.node(schema.root()).kind()
    }

    #[test]
    fn test_self_reference_terminates() {
        let schema = load_default(&json!({
            "properties": {"child": {"$ref": "#"}}
        }));
        let references: Vec<_> = schema
            .nodes()
            .filter_map(|(_, node)| match node.kind() {
                NodeKind::Reference(reference) => Some(reference),
                _ => None,
            })
            .collect();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].target(), Some(schema.root()));
    }

    #[test]
    fn test_shared_target_loaded_once() {
        let schema = load_default(&json!({
            "properties": {
                "a": {"$ref": "#/definitions/positive"},
                "b": {"$ref": "#/definitions/positive"}
            },
            "definitions": {"positive": {"minimum": 0}}
        }));
        let targets: Vec<_> = schema
            .nodes()
            .filter_map(|(_, node)| match node.kind() {
                NodeKind::Reference(reference) => reference.target(),
                _ => None,
            })
            .collect();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0], targets[1]);
    }

    #[test]
    fn test_single_constraint_carries_metadata() {
        let schema = load_default(&json!({"type": "string", "title": "Name", "x-internal": 1}));
        let node = schema.node(schema.root());
        assert!(matches!(node.kind(), NodeKind::String(_)));
        assert_eq!(node.meta().title(), Some("Name"));
        assert_eq!(node.meta().unprocessed().get("x-internal"), Some(&json!(1)));
    }

    #[test]
    fn test_several_constraints_are_combined() {
        let schema = load_default(&json!({"enum": [1, "a"], "type": "integer"}));
        let NodeKind::Combined(combined) = root_kind(&schema) else {
            panic!("Combined schema expected");
        };
        assert_eq!(combined.criterion, Criterion::All);
        assert!(combined.synthetic);
        assert_eq!(combined.subschemas.len(), 2);
    }

    #[test]
    fn test_type_array_becomes_any_of() {
        let schema = load_default(&json!({"type": ["string", "null"], "minLength": 2}));
        let NodeKind::Combined(combined) = root_kind(&schema) else {
            panic!("Combined schema expected");
        };
        assert_eq!(combined.criterion, Criterion::Any);
        let kinds: Vec<_> = combined
            .subschemas
            .iter()
            .map(|id| schema.node(*id).kind())
            .collect();
        assert!(matches!(kinds[0], NodeKind::String(s) if s.requires_string && s.min_length == Some(2)));
        assert!(matches!(kinds[1], NodeKind::Null));
    }

    #[test]
    fn test_sniffed_types_are_relaxed() {
        let schema = load_default(&json!({"minLength": 3, "minimum": 1}));
        let NodeKind::Combined(combined) = root_kind(&schema) else {
            panic!("Combined schema expected");
        };
        for id in &combined.subschemas {
            match schema.node(*id).kind() {
                NodeKind::String(string) => assert!(!string.requires_string),
                NodeKind::Number(number) => assert!(!number.requires_number),
                other => panic!("Unexpected node: {other:?}"),
            }
        }
    }

    #[test]
    fn test_tuple_items() {
        let schema = load_default(&json!({"items": [{"type": "string"}, true]}));
        let NodeKind::Array(array) = root_kind(&schema) else {
            panic!("Array schema expected");
        };
        assert!(matches!(&array.items, Some(Items::Tuple(items)) if items.len() == 2));
    }

    #[test]
    fn test_defaults_are_opt_in() {
        let schema_json = json!({"properties": {"a": {"type": "integer", "default": 42}}});
        let without = load_default(&schema_json);
        assert!(without.nodes().all(|(id, _)| without.default_value(id).is_none()));
        let with = crate::options()
            .use_defaults(true)
            .build(&schema_json)
            .expect("Valid schema");
        assert!(with
            .nodes()
            .any(|(id, _)| with.default_value(id) == Some(&json!(42))));
    }

    #[test_case(&json!({"type": "any"}), "/type"; "unknown type")]
    #[test_case(&json!({"type": ["string", 1]}), "/type/1"; "non-string type")]
    #[test_case(&json!({"enum": "a"}), "/enum"; "non-array enum")]
    #[test_case(&json!({"allOf": {}}), "/allOf"; "non-array allOf")]
    #[test_case(&json!({"anyOf": []}), "/anyOf"; "empty anyOf")]
    #[test_case(&json!({"properties": {"a": {"minLength": -1}}}), "/properties/a/minLength"; "negative length")]
    #[test_case(&json!({"pattern": "("}), "/pattern"; "invalid regex")]
    #[test_case(&json!({"multipleOf": 0}), "/multipleOf"; "zero multipleOf")]
    #[test_case(&json!({"items": 1}), "/items"; "non-schema items")]
    #[test_case(&json!({"title": 1}), "/title"; "non-string title")]
    fn test_definition_errors(schema: &Value, location: &str) {
        let error = crate::options().build(schema).expect_err("Should fail");
        assert_eq!(error.location().as_str(), location);
    }

    #[test]
    fn test_boolean_schemas_are_gated() {
        let error = crate::options()
            .with_draft(Draft::Draft4)
            .build(&json!({"properties": {"a": true}}))
            .expect_err("Should fail");
        assert!(matches!(
            error.kind(),
            SchemaErrorKind::BooleanSchemaUnsupported { .. }
        ));
        assert_eq!(error.location().as_str(), "/properties/a");
        assert!(crate::options()
            .with_draft(Draft::Draft6)
            .build(&json!({"properties": {"a": true}}))
            .is_ok());
    }

    #[test_case(&json!({"$ref": "#"}))]
    #[test_case(&json!({"definitions": {"a": {"$ref": "#/definitions/b"}, "b": {"$ref": "#/definitions/a"}}, "$ref": "#/definitions/a"}))]
    #[test_case(&json!({"allOf": [{"$ref": "#"}]}))]
    fn test_circular_references(schema: &Value) {
        let error = crate::options().build(schema).expect_err("Should fail");
        assert!(matches!(
            error.kind(),
            SchemaErrorKind::CircularReference { .. }
        ));
    }

    #[test]
    fn test_unknown_meta_schema() {
        let error = crate::options()
            .build(&json!({"$schema": "http://example.com/custom"}))
            .expect_err("Should fail");
        assert_eq!(
            error.to_string(),
            "Unknown meta-schema: 'http://example.com/custom' at '/$schema'"
        );
    }
}
