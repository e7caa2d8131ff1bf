//! Node identifiers

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Generator;

/// Process-wide monotonic ULID source
static GENERATOR: Lazy<Mutex<Generator>> = Lazy::new(|| Mutex::new(Generator::new()));

/// Opaque, globally unique node identifier
///
/// Freshly created nodes get a monotonic ULID. Ids read back from storage are
/// kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Allocate a fresh id, unique for the lifetime of the process
    ///
    /// # Panics
    /// Panics if more than 2^80 ids are requested within one millisecond.
    /// A collision would break the id-uniqueness invariant of every tree.
    #[must_use]
    pub fn generate() -> Self {
        let ulid = GENERATOR
            .lock()
            .generate()
            .expect("node id space exhausted within one millisecond");
        Self(ulid.to_string())
    }

    /// Wrap an existing identifier
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw identifier text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for NodeId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_are_unique_and_increasing() {
        let ids: Vec<NodeId> = (0..1000).map(|_| NodeId::generate()).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());

        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn persisted_ids_are_opaque() {
        let id = NodeId::from("node_1717000000_x1");
        assert_eq!(id.as_str(), "node_1717000000_x1");
        assert_eq!(
            serde_json::to_string(&id).unwrap(),
            "\"node_1717000000_x1\""
        );
    }
}
