//! Dirty tracking
//!
//! Two states, driven by four events:
//!
//! | from \ event | Edit  | SaveSucceeded | SaveFailed | Load  |
//! |--------------|-------|---------------|------------|-------|
//! | Clean        | Dirty | Clean         | Clean      | Clean |
//! | Dirty        | Dirty | Clean         | Dirty      | Clean |
//!
//! [`DirtyTracker`] refines `SaveSucceeded` with edit revisions: a save only
//! cleans the session if no edit landed after the save took its snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monotonic edit counter within one loaded document
pub type Revision = u64;

/// Whether the in-memory tree differs from the last saved version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DirtyState {
    #[default]
    Clean,
    Dirty,
}

/// Inputs to the dirty state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirtyEvent {
    /// Any structural or metadata mutation
    Edit,
    /// Storage accepted the whole document
    SaveSucceeded,
    /// Storage rejected the document
    SaveFailed,
    /// A new document replaced the session contents
    Load,
}

/// Next state for `event`; total over every pair
#[must_use]
pub fn transition(from: DirtyState, event: DirtyEvent) -> DirtyState {
    match (from, event) {
        (_, DirtyEvent::Edit) => DirtyState::Dirty,
        (_, DirtyEvent::SaveSucceeded | DirtyEvent::Load) => DirtyState::Clean,
        (state, DirtyEvent::SaveFailed) => state,
    }
}

/// Dirty state plus the revision bookkeeping behind it
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    state: DirtyState,
    revision: Revision,
    saved_revision: Revision,
    last_saved_at: Option<DateTime<Utc>>,
}

impl DirtyTracker {
    /// Fresh tracker for a just-loaded document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> DirtyState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state == DirtyState::Dirty
    }

    /// Current edit revision
    #[inline]
    #[must_use]
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Revision most recently confirmed by storage
    #[inline]
    #[must_use]
    pub fn saved_revision(&self) -> Revision {
        self.saved_revision
    }

    /// When storage last accepted this document in this session
    #[inline]
    #[must_use]
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Record a mutation; returns the new revision
    pub fn record_edit(&mut self) -> Revision {
        self.revision += 1;
        self.apply(DirtyEvent::Edit);
        self.revision
    }

    /// Record that storage accepted the snapshot taken at `snapshot`
    ///
    /// Edits made after the snapshot keep the session dirty.
    pub fn record_saved(&mut self, snapshot: Revision) {
        self.saved_revision = self.saved_revision.max(snapshot);
        self.last_saved_at = Some(Utc::now());
        if self.saved_revision >= self.revision {
            self.apply(DirtyEvent::SaveSucceeded);
        } else {
            tracing::debug!(
                saved = snapshot,
                current = self.revision,
                "edits landed during save; staying dirty"
            );
        }
    }

    /// Record a rejected save; a dirty session stays dirty
    pub fn record_save_failed(&mut self) {
        self.apply(DirtyEvent::SaveFailed);
    }

    /// Reset for a newly loaded document
    pub fn reset(&mut self) {
        *self = Self::default();
        self.apply(DirtyEvent::Load);
    }

    fn apply(&mut self, event: DirtyEvent) {
        let next = transition(self.state, event);
        if next != self.state {
            tracing::trace!(from = ?self.state, to = ?next, ?event, "dirty state changed");
        }
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        use DirtyEvent::*;
        use DirtyState::*;
        assert_eq!(transition(Clean, Edit), Dirty);
        assert_eq!(transition(Dirty, Edit), Dirty);
        assert_eq!(transition(Dirty, SaveSucceeded), Clean);
        assert_eq!(transition(Dirty, SaveFailed), Dirty);
        assert_eq!(transition(Clean, SaveFailed), Clean);
        assert_eq!(transition(Dirty, Load), Clean);
    }

    #[test]
    fn save_cleans_only_up_to_snapshot() {
        let mut tracker = DirtyTracker::new();
        tracker.record_edit();
        let snapshot = tracker.revision();
        tracker.record_edit();

        tracker.record_saved(snapshot);
        assert!(tracker.is_dirty());
        assert!(tracker.last_saved_at().is_some());

        tracker.record_saved(tracker.revision());
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn stale_save_never_regresses_saved_revision() {
        let mut tracker = DirtyTracker::new();
        tracker.record_edit();
        tracker.record_edit();
        tracker.record_saved(2);
        tracker.record_saved(1);
        assert_eq!(tracker.saved_revision(), 2);
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn failed_save_keeps_dirty() {
        let mut tracker = DirtyTracker::new();
        tracker.record_edit();
        tracker.record_save_failed();
        assert!(tracker.is_dirty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = DirtyTracker::new();
        tracker.record_edit();
        tracker.reset();
        assert_eq!(tracker.state(), DirtyState::Clean);
        assert_eq!(tracker.revision(), 0);
    }
}
