//! Preview orchestrator
//!
//! Owns a [`PreviewScheduler`] inside a tokio task. Tree, target, and
//! artifact-name changes arrive over an mpsc channel; generator calls run
//! as detached tasks that report back over a second channel; the task
//! publishes every visible change through a `watch` channel.
//!
//! In-flight generator calls are never cancelled. Their answers are simply
//! discarded when a newer request has been issued.

use crate::error::{GeneratorError, TargetError};
use crate::generator::{CodeGenerator, PreviewOutput, PreviewRequest};
use crate::scheduler::{Phase, PreviewScheduler, Seq, Verdict};
use crate::select::display_for;
use crate::target::{Framework, Language, Target};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use weft_ast::Body;

/// Preview settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Quiet period before a regeneration fires
    pub debounce_ms: u64,
    pub default_language: Language,
    pub default_framework: Framework,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            default_language: Language::TypeScript,
            default_framework: Framework::Express,
        }
    }
}

impl PreviewConfig {
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Configured starting target
    ///
    /// # Errors
    /// Returns [`TargetError::Unsupported`] for a mismatched pair.
    pub fn default_target(&self) -> Result<Target, TargetError> {
        Target::new(self.default_language, self.default_framework)
    }
}

/// What the preview area shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PreviewDisplay {
    /// Nothing rendered yet
    #[default]
    Empty,
    /// Rendered source; `file` and `files` are set for multi-file output
    Source {
        file: Option<String>,
        files: Vec<String>,
        text: String,
    },
    /// Placeholder for a failed generation
    Error(String),
}

impl PreviewDisplay {
    /// Displayed source text, if any
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Source { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Displayed file name, for multi-file output
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Source { file, .. } => file.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Published preview state
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewState {
    /// Currently selected target
    pub target: Target,
    /// A newer rendering is scheduled or in flight
    pub loading: bool,
    pub display: PreviewDisplay,
    /// Highest request sequence issued
    pub issued_seq: Seq,
    /// Sequence of the request whose answer is displayed
    pub applied_seq: Seq,
}

impl PreviewState {
    fn new(target: Target) -> Self {
        Self {
            target,
            loading: false,
            display: PreviewDisplay::Empty,
            issued_seq: 0,
            applied_seq: 0,
        }
    }
}

#[derive(Debug)]
enum Command {
    Tree(Body),
    Target(Target),
    Artifact(String),
    Retry,
}

#[derive(Debug)]
struct Reply {
    seq: Seq,
    result: Result<PreviewOutput, GeneratorError>,
}

/// Handle to a running preview task
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct PreviewOrchestrator {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<PreviewState>,
    task: JoinHandle<()>,
}

impl PreviewOrchestrator {
    /// Start previewing `body` for `target`
    ///
    /// The first rendering is scheduled right away through the normal
    /// debounce path. Must be called inside a tokio runtime.
    pub fn spawn(
        generator: Arc<dyn CodeGenerator>,
        config: &PreviewConfig,
        target: Target,
        artifact_name: impl Into<String>,
        body: Body,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (replies, reply_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(PreviewState::new(target));

        let driver = Driver {
            generator,
            scheduler: PreviewScheduler::new(config.debounce()),
            body,
            target,
            artifact: artifact_name.into(),
            state: state_tx,
            replies,
        };
        tracing::debug!(%target, debounce_ms = config.debounce_ms, "starting preview");
        let task = tokio::spawn(driver.run(command_rx, reply_rx));

        Self { commands, state, task }
    }

    /// The tree changed; equal trees are ignored
    pub fn tree_changed(&self, body: Body) {
        self.send(Command::Tree(body));
    }

    /// Switch target; re-selecting the current one is ignored
    pub fn set_target(&self, target: Target) {
        self.send(Command::Target(target));
    }

    /// The handler was renamed
    pub fn set_artifact_name(&self, name: impl Into<String>) {
        self.send(Command::Artifact(name.into()));
    }

    /// Regenerate with unchanged inputs
    pub fn retry(&self) {
        self.send(Command::Retry);
    }

    /// Latest published state
    #[must_use]
    pub fn state(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    /// Watch state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.state.clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("preview task is gone; change ignored");
        }
    }
}

impl Drop for PreviewOrchestrator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Driver {
    generator: Arc<dyn CodeGenerator>,
    scheduler: PreviewScheduler,
    body: Body,
    target: Target,
    artifact: String,
    state: watch::Sender<PreviewState>,
    replies: mpsc::UnboundedSender<Reply>,
}

impl Driver {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut replies: mpsc::UnboundedReceiver<Reply>,
    ) {
        self.changed();
        loop {
            let deadline = self.scheduler.deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.on_command(command),
                    None => break,
                },
                Some(reply) = replies.recv() => self.on_reply(reply),
                () = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire();
                }
            }
        }
        tracing::debug!("preview task stopped");
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Tree(body) => {
                if body == self.body {
                    tracing::trace!("tree unchanged; no regeneration");
                    return;
                }
                self.body = body;
            }
            Command::Target(target) => {
                if target == self.target {
                    tracing::trace!(%target, "target unchanged; no regeneration");
                    return;
                }
                tracing::debug!(from = %self.target, to = %target, "preview target switched");
                self.target = target;
                self.state.send_modify(|state| state.target = target);
            }
            Command::Artifact(name) => {
                if name == self.artifact {
                    return;
                }
                self.artifact = name;
            }
            Command::Retry => tracing::debug!("preview retry requested"),
        }
        self.changed();
    }

    fn changed(&mut self) {
        self.scheduler.on_change(Instant::now());
        self.publish_progress();
    }

    fn fire(&mut self) {
        let Some(seq) = self.scheduler.poll(Instant::now()) else {
            return;
        };
        let request = PreviewRequest {
            seq,
            target: self.target,
            artifact_name: self.artifact.clone(),
            body: self.body.clone(),
        };
        tracing::debug!(seq, target = %self.target, nodes = self.body.len(), "requesting preview");

        let generator = Arc::clone(&self.generator);
        let replies = self.replies.clone();
        tokio::spawn(async move {
            let call = tokio::spawn(async move { generator.preview(&request).await });
            let result = call.await.unwrap_or_else(|err| {
                tracing::error!(seq, error = %err, "preview generator task died");
                Err(GeneratorError::Unavailable(format!("generator task failed: {err}")))
            });
            // The driver may have stopped; nobody is left to show the result.
            let _ = replies.send(Reply { seq, result });
        });
        self.publish_progress();
    }

    fn on_reply(&mut self, reply: Reply) {
        let Reply { seq, result } = reply;
        if self.scheduler.on_response(seq) == Verdict::Discard {
            return;
        }
        let shown = match result {
            Ok(output) => display_for(output, &self.artifact),
            Err(err) => {
                tracing::warn!(seq, error = %err, retryable = err.is_retryable(), "preview generation failed");
                PreviewDisplay::Error(err.to_string())
            }
        };
        tracing::debug!(seq, file = shown.file(), "preview applied");
        let loading = self.scheduler.phase() != Phase::Idle;
        self.state.send_modify(|state| {
            state.display = shown;
            state.applied_seq = seq;
            state.loading = loading;
        });
    }

    fn publish_progress(&self) {
        let loading = self.scheduler.phase() != Phase::Idle;
        let issued = self.scheduler.issued();
        self.state.send_modify(|state| {
            state.loading = loading;
            state.issued_seq = issued;
        });
    }
}
