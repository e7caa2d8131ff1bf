//! Testing utilities for the weft workspace
//!
//! Shared fixtures, a scripted code generator, and an instrumented store.

#![allow(missing_docs)]
#![recursion_limit = "256"]

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use weft_ast::{Body, Node, TreeStats};
use weft_core::{DocumentStore, MemoryStore, StoreError};
use weft_preview::{CodeGenerator, GeneratorError, PreviewOutput, PreviewRequest, Target};
use weft_session::{DocumentId, HandlerSpec, Param};

// ----------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------

/// `if (user) { let user = User.findUnique; respond 200 }` then `return`
pub fn sample_body() -> Body {
    let lookup = Node::let_statement("user", Some(Node::db_query("User", "findUnique")));
    let respond = Node::http_respond(200, Some(Node::identifier("user")));
    let guard = Node::if_statement(Some(Node::ctx_get("params", "id")), vec![lookup, respond]);
    Body::from(vec![guard, Node::return_statement(None)])
}

pub fn sample_spec() -> HandlerSpec {
    HandlerSpec::new("getUser")
        .with_params(vec![Param::new("id", "string")])
        .with_return_type("User")
        .with_body(sample_body())
}

pub fn sample_document() -> DocumentId {
    DocumentId::from("users/get")
}

// ----------------------------------------------------------------------
// Scripted generator
// ----------------------------------------------------------------------

/// What a scripted generator call answers
#[derive(Debug, Clone)]
pub enum Reply {
    /// [`echo_output`] of the request
    Echo,
    Output(PreviewOutput),
    Fail(GeneratorError),
    /// Generator crashes mid-request
    Panic(&'static str),
}

#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub reply: Reply,
}

/// Generator answering from a script, then echoing
///
/// Every call is recorded before its delay starts, so request counts are
/// exact even while answers are still pending.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Step>>,
    latency: Duration,
    requests: Mutex<Vec<PreviewRequest>>,
    projects: Mutex<Vec<Target>>,
}

impl ScriptedGenerator {
    /// Echoes every request immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Echoes every unscripted request after `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn then(self, delay: Duration, reply: Reply) -> Self {
        self.script.lock().push_back(Step { delay, reply });
        self
    }

    pub fn then_echo(self, delay: Duration) -> Self {
        self.then(delay, Reply::Echo)
    }

    pub fn then_source(self, delay: Duration, text: &str) -> Self {
        self.then(delay, Reply::Output(PreviewOutput::Source(text.to_string())))
    }

    pub fn then_fail(self, delay: Duration, error: GeneratorError) -> Self {
        self.then(delay, Reply::Fail(error))
    }

    pub fn then_panic(self, delay: Duration, message: &'static str) -> Self {
        self.then(delay, Reply::Panic(message))
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<PreviewRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn projects(&self) -> Vec<Target> {
        self.projects.lock().clone()
    }
}

#[async_trait]
impl CodeGenerator for ScriptedGenerator {
    async fn preview(&self, request: &PreviewRequest) -> Result<PreviewOutput, GeneratorError> {
        self.requests.lock().push(request.clone());
        let step = self.script.lock().pop_front().unwrap_or(Step {
            delay: self.latency,
            reply: Reply::Echo,
        });
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        match step.reply {
            Reply::Echo => Ok(echo_output(request)),
            Reply::Output(output) => Ok(output),
            Reply::Fail(error) => Err(error),
            Reply::Panic(message) => panic!("{message}"),
        }
    }

    async fn generate_project(&self, target: &Target) -> Result<Vec<String>, GeneratorError> {
        self.projects.lock().push(*target);
        let ext = target.language().extension();
        Ok(vec![format!("src/main.{ext}"), format!("src/handlers.{ext}")])
    }
}

/// Two files: an entry point first, then one named after the artifact
pub fn echo_output(request: &PreviewRequest) -> PreviewOutput {
    let ext = request.target.language().extension();
    let mut files = IndexMap::new();
    files.insert(format!("main.{ext}"), format!("// {} entry point", request.target));
    files.insert(
        format!("handlers/{}.{ext}", request.artifact_name),
        echo_source(request),
    );
    PreviewOutput::Files(files)
}

/// One line identifying the request that produced it
pub fn echo_source(request: &PreviewRequest) -> String {
    format!(
        "// {} #{} {} ({} nodes)",
        request.target,
        request.seq,
        request.artifact_name,
        TreeStats::collect(&request.body).nodes
    )
}

// ----------------------------------------------------------------------
// Instrumented store
// ----------------------------------------------------------------------

/// [`MemoryStore`] with save latency, injected failures, and a save log
#[derive(Debug, Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    latency: Duration,
    failures: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    saves: Mutex<Vec<HandlerSpec>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Seed `document`
    ///
    /// # Panics
    /// If `spec` cannot be encoded.
    pub fn seeded(self, document: DocumentId, spec: &HandlerSpec) -> Self {
        self.inner.insert(document, spec).expect("fixture encodes");
        self
    }

    /// Make the next `count` saves fail as unavailable
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// Accepted saves, oldest first
    pub fn saves(&self) -> Vec<HandlerSpec> {
        self.saves.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().len()
    }

    /// Highest number of saves observed running at once
    pub fn max_concurrent_saves(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> &MemoryStore {
        &self.inner
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn load(&self, document: &DocumentId) -> Result<HandlerSpec, StoreError> {
        self.inner.load(document).await
    }

    async fn save(&self, document: &DocumentId, spec: &HandlerSpec) -> Result<(), StoreError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = if self.take_failure() {
            Err(StoreError::Unavailable("injected failure".into()))
        } else {
            self.saves.lock().push(spec.clone());
            self.inner.save(document, spec).await
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Store seeded with [`sample_spec`] under [`sample_document`]
pub fn setup_store(latency: Duration) -> Arc<RecordingStore> {
    Arc::new(RecordingStore::with_latency(latency).seeded(sample_document(), &sample_spec()))
}
