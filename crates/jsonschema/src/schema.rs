//! Schema graph.
//!
//! JSON Schema is a directed graph, where cycles may be introduced via `$ref`. Nodes are stored in
//! a single arena and address each other by [`NodeId`]; a `Reference` node holds the id of its
//! target instead of owning it, so cyclic schemas need no shared mutable aliasing.
//!
//! Nodes are pushed into the arena after all of their children, which means the id of a schema
//! is known only once the schema is fully loaded. References to a schema that is still being
//! loaded are back-patched when its load completes (see `loader::knots`).
use std::sync::Arc;

use referencing::Draft;
use serde_json::{Map, Number, Value};

use crate::{
    error::ValidationError,
    formats::Format,
    listener::ValidationListener,
    options::{ValidationConfig, ValidationMode},
    paths::Location,
    regex::Pattern,
    validator::Validator,
};

/// Stable handle of a node inside a [`Schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Attributes shared by every kind of schema node.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub(crate) id: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) location: Location,
    pub(crate) nullable: bool,
    pub(crate) default: Option<Value>,
    pub(crate) read_only: bool,
    pub(crate) write_only: bool,
    pub(crate) unprocessed: Map<String, Value>,
}

impl Metadata {
    pub(crate) fn at(location: Location) -> Metadata {
        Metadata {
            location,
            ..Metadata::default()
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// JSON Pointer of the schema inside its originating document.
    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    #[must_use]
    pub fn is_write_only(&self) -> bool {
        self.write_only
    }

    /// Keywords of the schema object that no loader step recognized.
    #[must_use]
    pub fn unprocessed(&self) -> &Map<String, Value> {
        &self.unprocessed
    }
}

/// A single node of the schema graph.
#[derive(Debug)]
pub struct SchemaNode {
    pub(crate) meta: Metadata,
    pub(crate) kind: NodeKind,
}

impl SchemaNode {
    pub(crate) fn new(meta: Metadata, kind: NodeKind) -> SchemaNode {
        SchemaNode { meta, kind }
    }

    #[must_use]
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The `default` value, captured only when defaults are enabled at load time.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.meta.default.as_ref()
    }

    /// Resolve a reference node exactly once.
    ///
    /// # Panics
    ///
    /// Panics if the node is not a reference or its target is already set.
    pub(crate) fn set_target(&mut self, target: NodeId) {
        match &mut self.kind {
            NodeKind::Reference(reference) => {
                assert!(
                    reference.target.is_none(),
                    "Reference '{}' at '{}' is resolved twice",
                    reference.reference,
                    self.meta.location
                );
                reference.target = Some(target);
            }
            _ => panic!(
                "Node at '{}' is not a reference and has no target",
                self.meta.location
            ),
        }
    }
}

/// Schema node variants.
#[derive(Debug)]
pub enum NodeKind {
    String(StringSchema),
    Number(NumberSchema),
    /// Matches booleans only.
    Boolean,
    /// Matches `null` only.
    Null,
    Array(ArraySchema),
    Object(ObjectSchema),
    /// `allOf` / `anyOf` / `oneOf`.
    Combined(CombinedSchema),
    /// `if` / `then` / `else`.
    Conditional(ConditionalSchema),
    Enum(Vec<Value>),
    Const(Value),
    Reference(ReferenceSchema),
    Not(NotSchema),
    /// Matches everything.
    Empty,
    /// The `true` schema.
    True,
    /// The `false` schema.
    False,
}

#[derive(Debug)]
pub struct StringSchema {
    /// When `false`, non-string instances are not violations.
    pub(crate) requires_string: bool,
    pub(crate) min_length: Option<u64>,
    pub(crate) max_length: Option<u64>,
    pub(crate) pattern: Option<Pattern>,
    pub(crate) format: Option<FormatCheck>,
}

/// A format keyword bound to its checker.
#[derive(Clone)]
pub struct FormatCheck {
    pub(crate) name: String,
    pub(crate) checker: Arc<dyn Format>,
}

impl std::fmt::Debug for FormatCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatCheck")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct NumberSchema {
    pub(crate) requires_number: bool,
    pub(crate) requires_integer: bool,
    pub(crate) minimum: Option<Number>,
    pub(crate) maximum: Option<Number>,
    pub(crate) exclusive_minimum: Option<Number>,
    pub(crate) exclusive_maximum: Option<Number>,
    pub(crate) multiple_of: Option<Number>,
}

#[derive(Debug)]
pub enum Items {
    /// Every item matches the same schema.
    All(NodeId),
    /// Positional schemas.
    Tuple(Vec<NodeId>),
}

/// `additionalItems` / `additionalProperties`.
#[derive(Debug, Clone, Copy)]
pub enum Additional {
    Allowed,
    Forbidden,
    Schema(NodeId),
}

#[derive(Debug)]
pub struct ArraySchema {
    pub(crate) requires_array: bool,
    pub(crate) items: Option<Items>,
    pub(crate) additional_items: Additional,
    pub(crate) min_items: Option<u64>,
    pub(crate) max_items: Option<u64>,
    pub(crate) unique_items: bool,
    pub(crate) contains: Option<NodeId>,
}

#[derive(Debug)]
pub struct ObjectSchema {
    pub(crate) requires_object: bool,
    /// In source order.
    pub(crate) properties: Vec<(String, NodeId)>,
    pub(crate) pattern_properties: Vec<(Pattern, NodeId)>,
    pub(crate) additional_properties: Additional,
    pub(crate) required: Vec<String>,
    pub(crate) min_properties: Option<u64>,
    pub(crate) max_properties: Option<u64>,
    pub(crate) property_dependencies: Vec<(String, Vec<String>)>,
    pub(crate) schema_dependencies: Vec<(String, NodeId)>,
    pub(crate) property_names: Option<NodeId>,
}

/// How many subschemas of a combined schema must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    All,
    Any,
    One,
}

impl Criterion {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Criterion::All => "allOf",
            Criterion::Any => "anyOf",
            Criterion::One => "oneOf",
        }
    }
}

#[derive(Debug)]
pub struct CombinedSchema {
    pub(crate) criterion: Criterion,
    pub(crate) subschemas: Vec<NodeId>,
    /// Created by the loader rather than written in the document, e.g. for `"type": [..]`
    /// or for a schema object holding several independent constraints.
    pub(crate) synthetic: bool,
}

#[derive(Debug)]
pub struct ConditionalSchema {
    pub(crate) if_: Option<NodeId>,
    pub(crate) then_: Option<NodeId>,
    pub(crate) else_: Option<NodeId>,
}

#[derive(Debug)]
pub struct ReferenceSchema {
    pub(crate) reference: String,
    pub(crate) target: Option<NodeId>,
}

impl ReferenceSchema {
    /// The `$ref` value as written.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[must_use]
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }
}

#[derive(Debug)]
pub struct NotSchema {
    pub(crate) schema: NodeId,
    /// The raw negated schema, used in failure messages.
    pub(crate) original: Value,
}

/// A loaded schema, ready to validate instances.
#[derive(Debug)]
pub struct Schema {
    nodes: Box<[SchemaNode]>,
    root: NodeId,
    draft: Draft,
}

impl Schema {
    pub(crate) fn new(nodes: Vec<SchemaNode>, root: NodeId, draft: Draft) -> Schema {
        Schema {
            nodes: nodes.into_boxed_slice(),
            root,
            draft,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn draft(&self) -> Draft {
        self.draft
    }

    /// # Panics
    ///
    /// Panics if the id does not belong to this schema.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SchemaNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx), node))
    }

    /// The `default` value of the given node, if defaults were captured at load time.
    #[must_use]
    pub fn default_value(&self, id: NodeId) -> Option<&Value> {
        self.node(id).default_value()
    }

    /// Run validation and return a boolean result.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validate(instance).is_ok()
    }

    /// Validate `instance`, stopping at the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate<'i>(&self, instance: &'i Value) -> Result<(), ValidationError<'i>> {
        self.validate_with(instance, &ValidationConfig::new(ValidationMode::EarlyFail))
    }

    /// Validate `instance`, collecting every violation into a single failure tree.
    ///
    /// # Errors
    ///
    /// Returns the failure tree if the instance does not conform.
    pub fn validate_all<'i>(&self, instance: &'i Value) -> Result<(), ValidationError<'i>> {
        self.validate_with(instance, &ValidationConfig::new(ValidationMode::Collecting))
    }

    /// Validate `instance` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns the failure (tree) if the instance does not conform.
    pub fn validate_with<'i>(
        &self,
        instance: &'i Value,
        config: &ValidationConfig,
    ) -> Result<(), ValidationError<'i>> {
        Validator::new(self, *config, None).run(instance)
    }

    /// Validate `instance`, reporting combinator, conditional and reference boundaries to
    /// `listener`.
    ///
    /// # Errors
    ///
    /// Returns the failure (tree) if the instance does not conform.
    pub fn validate_traced<'i>(
        &self,
        instance: &'i Value,
        config: &ValidationConfig,
        listener: &mut dyn ValidationListener,
    ) -> Result<(), ValidationError<'i>> {
        Validator::new(self, *config, Some(listener)).run(instance)
    }
}
