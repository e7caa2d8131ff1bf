//! Editing session
//!
//! Provides [`EditSession`], the single owner of the current tree for one
//! open handler. Every edit goes through the pure tree engine, replaces the
//! tree wholesale, and bumps the dirty tracker.

use crate::dirty::{DirtyState, DirtyTracker, Revision};
use crate::selection::Selection;
use crate::spec::{DocumentId, HandlerSpec};
use chrono::{DateTime, Utc};
use weft_ast::{tree, Body, Node, NodeId, Value};

/// Number of documents loaded into one session so far
pub type Generation = u64;

/// Document captured for a save, tagged with the load and revision it reflects
#[derive(Debug, Clone, PartialEq)]
pub struct SaveSnapshot {
    pub document: DocumentId,
    pub spec: HandlerSpec,
    pub generation: Generation,
    pub revision: Revision,
}

/// One open handler-editing session
#[derive(Debug, Clone)]
pub struct EditSession {
    document: DocumentId,
    spec: HandlerSpec,
    generation: Generation,
    selection: Selection,
    dirty: DirtyTracker,
}

impl EditSession {
    /// Open `spec` as a clean session with nothing selected
    #[must_use]
    pub fn open(document: DocumentId, spec: HandlerSpec) -> Self {
        tracing::info!(document = %document, handler = %spec.name, nodes = tree::ids(&spec.body).len(), "opened handler");
        Self {
            document,
            spec,
            generation: 0,
            selection: Selection::new(),
            dirty: DirtyTracker::new(),
        }
    }

    /// Replace the session contents with another document
    ///
    /// Resets to Clean and clears the selection. Reloading the same
    /// document still starts a new generation, so saves begun before the
    /// load can no longer clean the session.
    pub fn load(&mut self, document: DocumentId, spec: HandlerSpec) {
        let generation = self.generation + 1;
        *self = Self::open(document, spec);
        self.generation = generation;
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    #[inline]
    #[must_use]
    pub fn spec(&self) -> &HandlerSpec {
        &self.spec
    }

    #[inline]
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.spec.body
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    #[must_use]
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        tree::find(&self.spec.body, id)
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> DirtyState {
        self.dirty.state()
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    #[inline]
    #[must_use]
    pub fn revision(&self) -> Revision {
        self.dirty.revision()
    }

    /// Bumped by every [`load`](Self::load)
    #[inline]
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[inline]
    #[must_use]
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.dirty.last_saved_at()
    }

    // ------------------------------------------------------------------
    // Structural edits
    // ------------------------------------------------------------------

    /// Insert `node` under `parent` (top level when `None`)
    pub fn insert(&mut self, parent: Option<&NodeId>, node: Node, index: Option<usize>) -> &Body {
        let next = tree::insert(&self.spec.body, parent, node, index);
        self.replace_body(next)
    }

    /// Remove node `id` and its subtree; a removed selection is cleared
    pub fn remove(&mut self, id: &NodeId) -> &Body {
        let next = tree::remove(&self.spec.body, id);
        if self.selection.prune(&next) {
            tracing::debug!(id = %id, "selection cleared by removal");
        }
        self.replace_body(next)
    }

    /// Set field `key` on node `id`
    pub fn update_property(&mut self, id: &NodeId, key: &str, value: Value) -> &Body {
        let next = tree::update_property(&self.spec.body, id, key, value);
        self.replace_body(next)
    }

    // ------------------------------------------------------------------
    // Metadata edits
    // ------------------------------------------------------------------

    pub fn rename(&mut self, name: impl Into<String>) {
        self.spec.name = name.into();
        self.dirty.record_edit();
    }

    pub fn set_async(&mut self, is_async: bool) {
        self.spec.is_async = is_async;
        self.dirty.record_edit();
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Focus node `id`; never touches dirty state
    pub fn select(&mut self, id: NodeId) {
        self.selection.select(id);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    #[inline]
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Focused node, if it still exists
    #[must_use]
    pub fn selected_node(&self) -> Option<&Node> {
        self.selection.node(&self.spec.body)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Capture the whole document for a save
    #[must_use]
    pub fn snapshot(&self) -> SaveSnapshot {
        SaveSnapshot {
            document: self.document.clone(),
            spec: self.spec.clone(),
            generation: self.generation,
            revision: self.dirty.revision(),
        }
    }

    /// Storage accepted `snapshot`
    ///
    /// Ignored if the snapshot was taken before the current load, even when
    /// the same document was loaded again.
    pub fn mark_saved(&mut self, snapshot: &SaveSnapshot) {
        if snapshot.document != self.document || snapshot.generation != self.generation {
            tracing::debug!(
                saved = %snapshot.document,
                current = %self.document,
                saved_generation = snapshot.generation,
                generation = self.generation,
                "ignoring save taken before the current load"
            );
            return;
        }
        self.dirty.record_saved(snapshot.revision);
    }

    /// Storage rejected the last save; the session stays dirty
    pub fn mark_save_failed(&mut self) {
        self.dirty.record_save_failed();
    }

    fn replace_body(&mut self, next: Body) -> &Body {
        self.spec.body = next;
        self.dirty.record_edit();
        &self.spec.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ast::NodeKind;

    fn session() -> EditSession {
        EditSession::open(DocumentId::from("users/create"), HandlerSpec::new("createUser"))
    }

    #[test]
    fn starts_clean_without_selection() {
        let s = session();
        assert_eq!(s.state(), DirtyState::Clean);
        assert!(s.selection().selected().is_none());
        assert!(s.body().is_empty());
    }

    #[test]
    fn edits_make_dirty_and_selection_does_not() {
        let mut s = session();
        let node = Node::new(NodeKind::LetStatement);
        s.select(node.id().clone());
        assert!(!s.is_dirty());

        s.insert(None, node.clone(), None);
        assert!(s.is_dirty());
        assert_eq!(s.selected_node(), Some(&node));

        s.clear_selection();
        assert!(s.is_dirty());
    }

    #[test]
    fn removing_selected_node_clears_selection() {
        let mut s = session();
        let guard = Node::new(NodeKind::IfStatement);
        let query = Node::db_query("User", "findMany");
        s.insert(None, guard.clone(), None);
        s.insert(Some(guard.id()), query.clone(), None);
        s.select(query.id().clone());

        s.remove(guard.id());
        assert!(s.selection().selected().is_none());
        assert!(s.body().is_empty());
    }

    #[test]
    fn save_round_trip() {
        let mut s = session();
        s.insert(None, Node::return_statement(None), None);
        let snapshot = s.snapshot();
        assert_eq!(snapshot.spec.body.len(), 1);

        s.mark_save_failed();
        assert!(s.is_dirty());

        s.mark_saved(&snapshot);
        assert!(!s.is_dirty());
        assert!(s.last_saved_at().is_some());
    }

    #[test]
    fn edit_during_save_stays_dirty() {
        let mut s = session();
        s.insert(None, Node::return_statement(None), None);
        let snapshot = s.snapshot();
        s.rename("createAccount");
        s.mark_saved(&snapshot);
        assert!(s.is_dirty());
    }

    #[test]
    fn load_resets_state() {
        let mut s = session();
        let node = Node::identifier("x");
        s.insert(None, node.clone(), None);
        s.select(node.id().clone());

        s.load(DocumentId::from("users/delete"), HandlerSpec::new("deleteUser"));
        assert!(!s.is_dirty());
        assert!(s.selection().selected().is_none());
        assert_eq!(s.name(), "deleteUser");
    }

    #[test]
    fn save_for_other_document_is_ignored() {
        let mut s = session();
        s.insert(None, Node::identifier("x"), None);
        let snapshot = s.snapshot();
        s.load(DocumentId::from("other"), HandlerSpec::new("other"));
        s.insert(None, Node::identifier("y"), None);
        s.mark_saved(&snapshot);
        assert!(s.is_dirty());
    }

    #[test]
    fn save_from_before_reload_of_same_document_is_ignored() {
        let mut s = session();
        for _ in 0..3 {
            s.insert(None, Node::identifier("x"), None);
        }
        let snapshot = s.snapshot();

        s.load(DocumentId::from("users/create"), HandlerSpec::new("createUser"));
        assert_eq!(s.generation(), snapshot.generation + 1);
        s.insert(None, Node::return_statement(None), None);

        s.mark_saved(&snapshot);
        assert!(s.is_dirty());
        assert!(s.last_saved_at().is_none());
    }
}
