//! Portability summary and invariant checks over a body

use crate::id::NodeId;
use crate::kind::{NodeKind, Tier};
use crate::tree::{self, Body};
use serde::Serialize;
use std::collections::HashSet;

/// Shape and portability summary of a handler body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Total nodes, roots included
    pub nodes: usize,
    /// Deepest nesting level (a body of roots alone has depth 1)
    pub max_depth: usize,
    /// Node counts indexed by tier
    pub by_tier: [usize; 4],
    /// Whether any escape-hatch code is present
    pub has_native_bridge: bool,
}

impl TreeStats {
    /// Summarise `body`
    #[must_use]
    pub fn collect(body: &Body) -> Self {
        let mut stats = Self::default();
        tree::walk(body, &mut |node, depth| {
            stats.nodes += 1;
            stats.max_depth = stats.max_depth.max(depth + 1);
            stats.by_tier[usize::from(node.tier().as_u8())] += 1;
            stats.has_native_bridge |= node.kind() == NodeKind::NativeBridge;
        });
        stats
    }

    /// Nodes carrying `tier`
    #[inline]
    #[must_use]
    pub fn count(&self, tier: Tier) -> usize {
        self.by_tier[usize::from(tier.as_u8())]
    }

    /// Highest tier present, `None` for an empty body
    #[must_use]
    pub fn worst_tier(&self) -> Option<Tier> {
        Tier::ALL.iter().rev().copied().find(|tier| self.count(*tier) > 0)
    }

    /// Whether every node maps identically onto any target
    #[inline]
    #[must_use]
    pub fn is_fully_portable(&self) -> bool {
        self.nodes == self.count(Tier::Universal)
    }
}

/// Ids occurring more than once in `body`, in first-repeat order
///
/// Freshly built trees cannot contain duplicates; this is for documents read
/// back from storage.
#[must_use]
pub fn duplicate_ids(body: &Body) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for id in tree::ids(body) {
        if !seen.insert(id.clone()) && !repeated.contains(&id) {
            repeated.push(id);
        }
    }
    repeated
}
