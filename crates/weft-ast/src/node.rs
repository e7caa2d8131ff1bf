//! Node shape and constructors
//!
//! Provides [`Node`], the immutable element of a handler tree.

use crate::error::NodeError;
use crate::id::NodeId;
use crate::kind::{NodeKind, Tier};
use crate::value::Value;
use im::OrdMap;

/// Canonical container-slot order used when inserting into a parent that has
/// more than one slot
pub const SLOT_PRIORITY: [&str; 8] = [
    "body",
    "tryBody",
    "catchBody",
    "elseBody",
    "elements",
    "arguments",
    "properties",
    "arms",
];

/// Keys carried by every node outside its free-form fields
pub const RESERVED_KEYS: [&str; 3] = ["id", "type", "tier"];

/// Element of a handler tree
///
/// # Invariants
/// - `id` is fixed at creation and unique within any tree the node lives in
/// - fields never use a [`RESERVED_KEYS`] name
/// - nodes are never mutated in place; every edit yields a new value that
///   shares untouched fields with the old one
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    tier: Tier,
    fields: OrdMap<String, Value>,
}

impl Node {
    /// Create a node of `kind` with a fresh id, its kind's tier, and its
    /// default field template
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        let fields = kind
            .template()
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        Self {
            id: NodeId::generate(),
            kind,
            tier: kind.tier(),
            fields,
        }
    }

    /// Create a node from a discriminator name (wire or palette shorthand)
    ///
    /// # Errors
    /// Returns [`NodeError::UnknownType`] for names outside the closed set.
    pub fn from_type_name(name: &str) -> Result<Self, NodeError> {
        Ok(Self::new(name.parse()?))
    }

    /// Reassemble a node from stored parts, keeping its id and tier verbatim
    #[must_use]
    pub fn from_parts(
        id: NodeId,
        kind: NodeKind,
        tier: Tier,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        let fields = fields
            .into_iter()
            .filter(|(key, _)| !is_reserved(key))
            .collect();
        Self {
            id,
            kind,
            tier,
            fields,
        }
    }

    // ------------------------------------------------------------------
    // Typed constructors
    // ------------------------------------------------------------------

    /// `let name = value`
    #[must_use]
    pub fn let_statement(name: &str, value: Option<Node>) -> Self {
        Self::new(NodeKind::LetStatement)
            .with("name", name)
            .with("value", value)
    }

    /// `if condition { body }`
    #[must_use]
    pub fn if_statement(condition: Option<Node>, body: Vec<Node>) -> Self {
        Self::new(NodeKind::IfStatement)
            .with("condition", condition)
            .with("body", body)
    }

    /// `for variable in iterable { body }`
    #[must_use]
    pub fn for_statement(variable: &str, iterable: Option<Node>, body: Vec<Node>) -> Self {
        Self::new(NodeKind::ForStatement)
            .with("variable", variable)
            .with("iterable", iterable)
            .with("body", body)
    }

    /// `try { try_body } catch (param) { catch_body }`
    #[must_use]
    pub fn try_catch(try_body: Vec<Node>, catch_param: &str, catch_body: Vec<Node>) -> Self {
        Self::new(NodeKind::TryCatchStatement)
            .with("tryBody", try_body)
            .with("catchParam", catch_param)
            .with("catchBody", catch_body)
    }

    #[must_use]
    pub fn return_statement(value: Option<Node>) -> Self {
        Self::new(NodeKind::ReturnStatement).with("value", value)
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::new(NodeKind::Literal).with("value", value)
    }

    #[must_use]
    pub fn identifier(name: &str) -> Self {
        Self::new(NodeKind::Identifier).with("name", name)
    }

    #[must_use]
    pub fn binary(operator: &str, left: Node, right: Node) -> Self {
        Self::new(NodeKind::BinaryExpression)
            .with("operator", operator)
            .with("left", left)
            .with("right", right)
    }

    #[must_use]
    pub fn call(callee: Node, arguments: Vec<Node>) -> Self {
        Self::new(NodeKind::CallExpression)
            .with("callee", callee)
            .with("arguments", arguments)
    }

    #[must_use]
    pub fn member(object: Node, property: &str) -> Self {
        Self::new(NodeKind::MemberExpression)
            .with("object", object)
            .with("property", property)
    }

    #[must_use]
    pub fn array(elements: Vec<Node>) -> Self {
        Self::new(NodeKind::ArrayExpression).with("elements", elements)
    }

    /// Database read on `model` (`findMany`, `findUnique`, ...)
    #[must_use]
    pub fn db_query(model: &str, operation: &str) -> Self {
        Self::new(NodeKind::DbQuery)
            .with("model", model)
            .with("operation", operation)
    }

    /// Database write on `model` (`create`, `update`, `delete`)
    #[must_use]
    pub fn db_mutate(model: &str, operation: &str, data: Option<Node>) -> Self {
        Self::new(NodeKind::DbMutate)
            .with("model", model)
            .with("operation", operation)
            .with("data", data)
    }

    #[must_use]
    pub fn http_respond(status: i64, body: Option<Node>) -> Self {
        Self::new(NodeKind::HttpRespond)
            .with("status", status)
            .with("body", body)
    }

    /// Read `key` from request `source` (`params`, `query`, `body`, `headers`)
    #[must_use]
    pub fn ctx_get(source: &str, key: &str) -> Self {
        Self::new(NodeKind::CtxGet)
            .with("source", source)
            .with("key", key)
    }

    /// Opaque target-specific code
    #[must_use]
    pub fn native_bridge(language: &str, code: &str) -> Self {
        Self::new(NodeKind::NativeBridge)
            .with("language", language)
            .with("code", code)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Wire discriminator
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// All free-form fields, ordered by key
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &OrdMap<String, Value> {
        &self.fields
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Singular child stored under `key`
    #[must_use]
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.get(key).and_then(Value::as_node)
    }

    /// Nodes held by the container slot `key`, empty if `key` is not a slot
    #[must_use]
    pub fn slot(&self, key: &str) -> Vec<&Node> {
        match self.get(key) {
            Some(value) if value.is_node_list() => value.child_nodes().collect(),
            _ => Vec::new(),
        }
    }

    /// Every direct child, in field order
    pub fn children(&self) -> impl Iterator<Item = &Node> + '_ {
        self.fields.values().flat_map(Value::child_nodes)
    }

    /// Names of fields shaped like container slots, in key order
    #[must_use]
    pub fn container_slots(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, value)| value.is_node_list())
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Slot that receives children inserted under this node
    ///
    /// The first [`SLOT_PRIORITY`] name present as a node list wins; failing
    /// that, the first other field already holding child nodes. `None` means
    /// the node cannot take children.
    #[must_use]
    pub fn insertion_slot(&self) -> Option<&str> {
        if let Some(key) = SLOT_PRIORITY
            .iter()
            .find(|key| self.get(key).is_some_and(Value::is_node_list))
        {
            return Some(*key);
        }
        self.fields
            .iter()
            .find(|(_, value)| value.is_populated_node_list())
            .map(|(key, _)| key.as_str())
    }

    // ------------------------------------------------------------------
    // Persistent updates
    // ------------------------------------------------------------------

    /// Builder-style field assignment
    ///
    /// Reserved keys are ignored, as are values holding a plain object that
    /// would read back as a node.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        if is_reserved(key) {
            return self;
        }
        let value = value.into();
        if value.contains_node_shaped_object() {
            tracing::warn!(id = %self.id, key, "refusing plain object shaped like a node");
            return self;
        }
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Copy of this node with one field replaced
    #[must_use]
    pub fn with_field(&self, key: &str, value: Value) -> Self {
        self.clone().with(key, value)
    }

    /// Copy of this node with `child` inserted into slot `key` at `index`
    /// (clamped; `None` appends)
    #[must_use]
    pub(crate) fn with_child_inserted(&self, key: &str, child: Node, index: Option<usize>) -> Self {
        let mut items = self
            .get(key)
            .and_then(Value::as_list)
            .cloned()
            .unwrap_or_default();
        let at = index.map_or(items.len(), |i| i.min(items.len()));
        items.insert(at, Value::from(child));
        self.with_field(key, Value::List(items))
    }
}

/// Whether `key` names one of the node header fields
#[inline]
#[must_use]
pub(crate) fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}
