//! Field values
//!
//! A node's fields are plain structured data. The tree engine discovers
//! children by shape alone: a [`Value::Node`] is a singular child, and a
//! [`Value::List`] whose elements are all nodes is a container slot.

use crate::kind::NodeKind;
use crate::node::Node;
use im::{OrdMap, Vector};

/// Structured field payload
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit absence (also what a removed singular child becomes)
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    /// Singular child reference
    Node(Box<Node>),
    /// Ordered sequence; a container slot when every element is a node
    List(Vector<Value>),
    Object(OrdMap<String, Value>),
}

impl Value {
    /// Empty list, the initial state of a container slot
    #[inline]
    #[must_use]
    pub fn empty_list() -> Self {
        Self::List(Vector::new())
    }

    /// Build a container slot from nodes
    #[must_use]
    pub fn nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self::List(nodes.into_iter().map(Value::from).collect())
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Singular child, if this value is node-shaped
    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&Vector<Value>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this value can hold child nodes as a container slot
    ///
    /// True for a list whose elements are all nodes, including the empty list.
    #[must_use]
    pub fn is_node_list(&self) -> bool {
        match self {
            Self::List(items) => items.iter().all(|item| item.as_node().is_some()),
            _ => false,
        }
    }

    /// Whether this value is a container slot that already holds children
    #[must_use]
    pub fn is_populated_node_list(&self) -> bool {
        matches!(self, Self::List(items) if !items.is_empty()) && self.is_node_list()
    }

    /// Whether a plain object anywhere inside this value carries an `id`, a
    /// `tier`, and a known kind as `type`
    ///
    /// Such an object would decode back as a node, so nodes refuse to hold it.
    #[must_use]
    pub fn contains_node_shaped_object(&self) -> bool {
        match self {
            Self::Object(map) => {
                let shaped = map
                    .get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.parse::<NodeKind>().is_ok())
                    && matches!(map.get("id"), Some(Self::String(_) | Self::Number(_)))
                    && map.contains_key("tier");
                shaped || map.values().any(Value::contains_node_shaped_object)
            }
            Self::List(items) => items.iter().any(Value::contains_node_shaped_object),
            _ => false,
        }
    }

    /// Child nodes directly reachable from this value
    ///
    /// Walks lists and objects; does not descend into the nodes themselves.
    pub fn child_nodes(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        match self {
            Self::Node(node) => Box::new(std::iter::once(node.as_ref())),
            Self::List(items) => Box::new(items.iter().flat_map(Value::child_nodes)),
            Self::Object(map) => Box::new(map.values().flat_map(Value::child_nodes)),
            _ => Box::new(std::iter::empty()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no structured-data form and become `Null`
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Self::Node(Box::new(node))
    }
}

impl From<Option<Node>> for Value {
    fn from(node: Option<Node>) -> Self {
        node.map_or(Self::Null, Self::from)
    }
}

impl From<Vec<Node>> for Value {
    fn from(nodes: Vec<Node>) -> Self {
        Self::nodes(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_list_shape() {
        assert!(Value::empty_list().is_node_list());
        assert!(!Value::empty_list().is_populated_node_list());

        let slot = Value::nodes([Node::new(NodeKind::Identifier)]);
        assert!(slot.is_node_list());
        assert!(slot.is_populated_node_list());

        let strings = Value::List(im::vector![Value::from("a"), Value::from("b")]);
        assert!(!strings.is_node_list());

        let mixed = Value::List(im::vector![
            Value::from(Node::new(NodeKind::Identifier)),
            Value::from(1_i64)
        ]);
        assert!(!mixed.is_node_list());
        assert!(!Value::Null.is_node_list());
    }

    #[test]
    fn node_shaped_objects_are_detected_at_any_depth() {
        let shaped = Value::Object(
            OrdMap::new()
                .update("id".to_string(), Value::from("n9"))
                .update("type".to_string(), Value::from("Identifier"))
                .update("tier".to_string(), Value::from(0_i64)),
        );
        assert!(shaped.contains_node_shaped_object());
        assert!(Value::List(im::vector![Value::Null, shaped]).contains_node_shaped_object());

        let filter = Value::Object(
            OrdMap::new()
                .update("id".to_string(), Value::from("n9"))
                .update("type".to_string(), Value::from("eq"))
                .update("tier".to_string(), Value::from(0_i64)),
        );
        assert!(!filter.contains_node_shaped_object());
        assert!(!Value::from(Node::new(NodeKind::Identifier)).contains_node_shaped_object());
    }

    #[test]
    fn child_nodes_walks_nested_objects() {
        let a = Node::new(NodeKind::Identifier);
        let b = Node::new(NodeKind::Literal);
        let object = Value::Object(
            OrdMap::new()
                .update("first".to_string(), Value::from(a.clone()))
                .update("rest".to_string(), Value::nodes([b.clone()])),
        );
        let ids: Vec<_> = object.child_nodes().map(|n| n.id().clone()).collect();
        assert_eq!(ids, vec![a.id().clone(), b.id().clone()]);
    }

    #[test]
    fn non_finite_float_is_null() {
        assert!(Value::from(f64::NAN).is_null());
        assert_eq!(Value::from(1.5).as_i64(), None);
        assert_eq!(Value::from(7_i64).as_i64(), Some(7));
    }
}
