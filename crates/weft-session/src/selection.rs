//! Focused-node tracking

use weft_ast::{tree, Body, Node, NodeId};

/// Which node, if any, is focused on the canvas
///
/// Holds only an id. A selected id may go stale when the tree changes;
/// lookups through [`Selection::node`] then simply come back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<NodeId>,
}

impl Selection {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, id: NodeId) {
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Selected node in `body`, if it still exists
    #[must_use]
    pub fn node<'a>(&self, body: &'a Body) -> Option<&'a Node> {
        self.selected.as_ref().and_then(|id| tree::find(body, id))
    }

    /// Drop a selection that no longer resolves in `body`; returns whether
    /// it was dropped
    pub fn prune(&mut self, body: &Body) -> bool {
        let stale = self
            .selected
            .as_ref()
            .is_some_and(|id| !tree::contains(body, id));
        if stale {
            self.selected = None;
        }
        stale
    }
}
