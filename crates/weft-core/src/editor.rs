//! Editor façade
//!
//! One [`Editor`] per open handler. It owns the [`EditSession`], forwards
//! every edit to the preview orchestrator, and serializes saves.
//!
//! # Saving
//!
//! Saves are single-flight. A save requested while another is running waits
//! for it, then snapshots the latest tree, so edits made during a save are
//! never dropped. A save that finds the session clean does nothing.
//!
//! With autosave enabled, a background task waits for edits to settle for
//! the configured quiet period and then goes through the same save path.

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::palette::Palette;
use crate::render::{CanvasRow, RendererRegistry};
use crate::store::DocumentStore;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use weft_ast::{Body, Node, NodeId, NodeKind, TreeStats, Value};
use weft_preview::{CodeGenerator, PreviewOrchestrator, PreviewState, Target};
use weft_session::{DirtyState, DocumentId, EditSession, HandlerSpec, Revision};

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Storage accepted the snapshot taken at `revision`
    Saved {
        revision: Revision,
        /// `false` if edits landed while the save was running
        clean: bool,
    },
    /// Nothing to save
    AlreadyClean,
}

struct Inner {
    session: Mutex<EditSession>,
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn CodeGenerator>,
    preview: PreviewOrchestrator,
    save_gate: tokio::sync::Mutex<()>,
    edits: watch::Sender<Revision>,
    palette: Palette,
    renderers: RendererRegistry,
}

/// Handler editor bound to one store and one generator
pub struct Editor {
    inner: Arc<Inner>,
    autosave: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.session.lock();
        f.debug_struct("Editor")
            .field("document", session.document())
            .field("state", &session.state())
            .field("autosave", &self.autosave.is_some())
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Load `document` and start its preview
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// - [`EditorError::Config`] for an invalid configuration
    /// - [`EditorError::Store`] if the document cannot be loaded
    pub async fn open(
        config: &EditorConfig,
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn CodeGenerator>,
        document: DocumentId,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        let target = config.target()?;
        let spec = store.load(&document).await?;

        let preview = PreviewOrchestrator::spawn(
            Arc::clone(&generator),
            &config.preview,
            target,
            spec.name.clone(),
            spec.body.clone(),
        );
        let (edits, edit_rx) = watch::channel(0);
        let inner = Arc::new(Inner {
            session: Mutex::new(EditSession::open(document, spec)),
            store,
            generator,
            preview,
            save_gate: tokio::sync::Mutex::new(()),
            edits,
            palette: Palette::standard(),
            renderers: RendererRegistry::with_defaults(),
        });

        let autosave = config.autosave.enabled.then(|| {
            let quiet = config.autosave.quiet_period();
            tracing::debug!(quiet_ms = config.autosave.quiet_period_ms, "autosave enabled");
            tokio::spawn(autosave(Arc::downgrade(&inner), edit_rx, quiet))
        });

        Ok(Self { inner, autosave })
    }

    /// Replace the open document
    ///
    /// Unsaved edits to the previous document are discarded.
    ///
    /// # Errors
    /// Returns [`EditorError::Store`] and keeps the current document if the
    /// new one cannot be loaded.
    pub async fn load(&self, document: DocumentId) -> Result<(), EditorError> {
        let spec = self.inner.store.load(&document).await?;
        let (name, body) = {
            let mut session = self.inner.session.lock();
            if session.is_dirty() {
                tracing::warn!(document = %session.document(), "discarding unsaved edits");
            }
            session.load(document, spec);
            (session.name().to_string(), session.body().clone())
        };
        self.inner.preview.set_artifact_name(name);
        self.inner.preview.tree_changed(body);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    #[must_use]
    pub fn document(&self) -> DocumentId {
        self.inner.session.lock().document().clone()
    }

    #[must_use]
    pub fn spec(&self) -> HandlerSpec {
        self.inner.session.lock().spec().clone()
    }

    /// Current tree; cheap, shares structure with the session
    #[must_use]
    pub fn body(&self) -> Body {
        self.inner.session.lock().body().clone()
    }

    #[must_use]
    pub fn find(&self, id: &NodeId) -> Option<Node> {
        self.inner.session.lock().find(id).cloned()
    }

    #[must_use]
    pub fn state(&self) -> DirtyState {
        self.inner.session.lock().state()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.session.lock().is_dirty()
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        TreeStats::collect(self.inner.session.lock().body())
    }

    /// Canvas outline of the current tree
    #[must_use]
    pub fn outline(&self) -> Vec<CanvasRow> {
        let body = self.body();
        self.inner.renderers.outline(&body)
    }

    #[inline]
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.inner.palette
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Insert `node` under `parent`, or at top level
    pub fn insert(&self, parent: Option<&NodeId>, node: Node, index: Option<usize>) -> Body {
        self.edit(|session| {
            session.insert(parent, node, index);
        })
    }

    /// Insert a fresh templated node of `kind`; returns its id
    pub fn insert_kind(&self, parent: Option<&NodeId>, kind: NodeKind) -> NodeId {
        let node = Node::new(kind);
        let id = node.id().clone();
        self.insert(parent, node, None);
        id
    }

    /// Insert a fresh node for palette entry `name`
    ///
    /// # Errors
    /// Returns [`EditorError::Node`] if the palette has no such entry; the
    /// tree is left untouched.
    pub fn insert_from_palette(&self, parent: Option<&NodeId>, name: &str) -> Result<NodeId, EditorError> {
        let node = self.inner.palette.create(name)?;
        let id = node.id().clone();
        self.insert(parent, node, None);
        Ok(id)
    }

    pub fn remove(&self, id: &NodeId) -> Body {
        self.edit(|session| {
            session.remove(id);
        })
    }

    pub fn update_property(&self, id: &NodeId, key: &str, value: impl Into<Value>) -> Body {
        let value = value.into();
        self.edit(|session| {
            session.update_property(id, key, value);
        })
    }

    /// Rename the handler; also re-targets preview file selection
    pub fn rename(&self, name: &str) {
        self.edit(|session| session.rename(name));
        self.inner.preview.set_artifact_name(name);
    }

    pub fn set_async(&self, is_async: bool) {
        self.edit(|session| session.set_async(is_async));
    }

    fn edit(&self, apply: impl FnOnce(&mut EditSession)) -> Body {
        let (body, revision) = {
            let mut session = self.inner.session.lock();
            apply(&mut session);
            (session.body().clone(), session.revision())
        };
        self.inner.preview.tree_changed(body.clone());
        self.inner.edits.send_replace(revision);
        body
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn select(&self, id: NodeId) {
        self.inner.session.lock().select(id);
    }

    pub fn clear_selection(&self) {
        self.inner.session.lock().clear_selection();
    }

    #[must_use]
    pub fn selected(&self) -> Option<Node> {
        self.inner.session.lock().selected_node().cloned()
    }

    // ------------------------------------------------------------------
    // Preview
    // ------------------------------------------------------------------

    pub fn set_target(&self, target: Target) {
        self.inner.preview.set_target(target);
    }

    pub fn retry_preview(&self) {
        self.inner.preview.retry();
    }

    #[must_use]
    pub fn preview_state(&self) -> PreviewState {
        self.inner.preview.state()
    }

    #[must_use]
    pub fn subscribe_preview(&self) -> watch::Receiver<PreviewState> {
        self.inner.preview.subscribe()
    }

    /// Ask the generator for a full project in the selected target
    ///
    /// # Errors
    /// Returns [`EditorError::Generator`] on generator failure.
    pub async fn generate_project(&self) -> Result<Vec<String>, EditorError> {
        let target = self.inner.preview.state().target;
        let paths = self.inner.generator.generate_project(&target).await?;
        tracing::info!(%target, files = paths.len(), "project generated");
        Ok(paths)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Save the whole document if it is dirty
    ///
    /// # Errors
    /// Returns [`EditorError::Store`] if storage rejects the document; the
    /// session stays dirty and the call may be retried.
    pub async fn save(&self) -> Result<SaveOutcome, EditorError> {
        self.inner.save().await
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        if let Some(task) = self.autosave.take() {
            task.abort();
        }
    }
}

impl Inner {
    async fn save(&self) -> Result<SaveOutcome, EditorError> {
        let _flight = self.save_gate.lock().await;
        let snapshot = {
            let session = self.session.lock();
            if !session.is_dirty() {
                return Ok(SaveOutcome::AlreadyClean);
            }
            session.snapshot()
        };
        tracing::debug!(document = %snapshot.document, revision = snapshot.revision, "saving");

        match self.store.save(&snapshot.document, &snapshot.spec).await {
            Ok(()) => {
                let mut session = self.session.lock();
                session.mark_saved(&snapshot);
                let clean = !session.is_dirty();
                tracing::info!(document = %snapshot.document, revision = snapshot.revision, clean, "saved");
                Ok(SaveOutcome::Saved {
                    revision: snapshot.revision,
                    clean,
                })
            }
            Err(err) => {
                self.session.lock().mark_save_failed();
                tracing::warn!(document = %snapshot.document, error = %err, retryable = err.is_retryable(), "save failed");
                Err(err.into())
            }
        }
    }
}

/// Save after edits have been quiet for `quiet`
async fn autosave(inner: Weak<Inner>, mut edits: watch::Receiver<Revision>, quiet: Duration) {
    while edits.changed().await.is_ok() {
        loop {
            tokio::select! {
                changed = edits.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                () = tokio::time::sleep(quiet) => break,
            }
        }
        let Some(inner) = inner.upgrade() else {
            return;
        };
        match inner.save().await {
            Ok(outcome) => tracing::debug!(?outcome, "autosave"),
            Err(err) => tracing::warn!(error = %err, "autosave failed; will retry after the next edit"),
        }
    }
}
