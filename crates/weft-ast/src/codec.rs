//! Structured-data codec
//!
//! Nodes round-trip through plain JSON-shaped data: the node header
//! (`id`, `type`, `tier`) followed by every field, nested nodes included.
//! On the way in, an object is read as a node only when it carries an `id`,
//! a `tier`, and a `type` naming a known kind; everything else stays plain
//! data. [`Node::with`] refuses plain objects of that shape, so encoding is
//! never ambiguous.

use crate::error::NodeError;
use crate::id::NodeId;
use crate::kind::{NodeKind, Tier};
use crate::node::Node;
use crate::value::Value;
use im::{OrdMap, Vector};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

impl Node {
    /// Encode as structured data
    #[must_use]
    pub fn to_json(&self) -> Json {
        let mut map = Map::new();
        map.insert("id".to_string(), Json::String(self.id().to_string()));
        map.insert("type".to_string(), Json::String(self.type_name().to_string()));
        map.insert("tier".to_string(), Json::from(self.tier().as_u8()));
        for (key, value) in self.fields() {
            map.insert(key.clone(), value.to_json());
        }
        Json::Object(map)
    }

    /// Decode from structured data
    ///
    /// A missing `id` is replaced by a fresh one; a missing `tier` is taken
    /// from the kind. A stored tier is kept verbatim, even if it differs
    /// from the kind's default.
    ///
    /// # Errors
    /// - [`NodeError::Malformed`] if `json` is not an object with a string `type`
    /// - [`NodeError::UnknownType`] for a discriminator outside the closed set
    /// - [`NodeError::InvalidTier`] for a tier outside 0..=3
    pub fn from_json(json: &Json) -> Result<Self, NodeError> {
        let Json::Object(map) = json else {
            return Err(NodeError::Malformed("expected an object".to_string()));
        };

        let kind: NodeKind = map
            .get("type")
            .and_then(Json::as_str)
            .ok_or_else(|| NodeError::Malformed("missing string `type`".to_string()))?
            .parse()?;

        let id = match map.get("id") {
            Some(Json::String(raw)) => NodeId::new(raw.as_str()),
            Some(Json::Number(n)) => NodeId::new(n.to_string()),
            None | Some(Json::Null) => {
                let fresh = NodeId::generate();
                tracing::debug!(kind = %kind, id = %fresh, "assigned id to stored node without one");
                fresh
            }
            Some(other) => {
                return Err(NodeError::Malformed(format!("unsupported id: {other}")));
            }
        };

        let tier = match map.get("tier") {
            None | Some(Json::Null) => kind.tier(),
            Some(Json::Number(n)) => {
                let raw = n
                    .as_u64()
                    .ok_or_else(|| NodeError::Malformed(format!("non-integer tier: {n}")))?;
                u8::try_from(raw)
                    .map_err(|_| NodeError::InvalidTier(raw))
                    .and_then(Tier::try_from)?
            }
            Some(other) => {
                return Err(NodeError::Malformed(format!("unsupported tier: {other}")));
            }
        };

        let fields = map
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "id" | "type" | "tier"))
            .map(|(key, value)| Ok((key.clone(), Value::from_json(value)?)))
            .collect::<Result<Vec<_>, NodeError>>()?;

        Ok(Node::from_parts(id, kind, tier, fields))
    }
}

impl Value {
    /// Encode as structured data
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Number(n) => Json::Number(n.clone()),
            Self::String(s) => Json::String(s.clone()),
            Self::Node(node) => node.to_json(),
            Self::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Self::Object(map) => Json::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Decode from structured data, recognising node-shaped objects
    ///
    /// # Errors
    /// Propagates [`Node::from_json`] errors for node-shaped objects.
    pub fn from_json(json: &Json) -> Result<Self, NodeError> {
        Ok(match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(*b),
            Json::Number(n) => Self::Number(n.clone()),
            Json::String(s) => Self::String(s.clone()),
            Json::Array(items) => Self::List(
                items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Result<Vector<_>, _>>()?,
            ),
            Json::Object(map) if looks_like_node(map) => Self::from(Node::from_json(json)?),
            Json::Object(map) => Self::Object(
                map.iter()
                    .map(|(key, value)| Ok((key.clone(), Value::from_json(value)?)))
                    .collect::<Result<OrdMap<_, _>, NodeError>>()?,
            ),
        })
    }
}

/// Capability check: an object is a node when it carries an id, a tier, and
/// a known kind
fn looks_like_node(map: &Map<String, Json>) -> bool {
    map.get("type")
        .and_then(Json::as_str)
        .is_some_and(|name| name.parse::<NodeKind>().is_ok())
        && matches!(map.get("id"), Some(Json::String(_) | Json::Number(_)))
        && map.contains_key("tier")
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.fields().len()))?;
        map.serialize_entry("id", self.id())?;
        map.serialize_entry("type", self.type_name())?;
        map.serialize_entry("tier", &self.tier())?;
        for (key, value) in self.fields() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Node(node) => node.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Node::from_json(&json).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        Value::from_json(&json).map_err(de::Error::custom)
    }
}
