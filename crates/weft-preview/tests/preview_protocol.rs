//! Debounce, latest-wins, and target-switch behavior of the preview task.
//!
//! Every test runs on a paused clock; sleeping advances virtual time and
//! lets every timer due before the wake-up fire first.

#![recursion_limit = "256"]

use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use weft_ast::{tree, Body, Node};
use weft_preview::{
    GeneratorError, PreviewConfig, PreviewDisplay, PreviewOrchestrator, PreviewOutput, Target,
};
use weft_test_utils::{sample_body, Reply, ScriptedGenerator};

const SETTLE: Duration = Duration::from_secs(5);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn config() -> PreviewConfig {
    PreviewConfig {
        debounce_ms: 100,
        ..PreviewConfig::default()
    }
}

fn spawn(generator: &Arc<ScriptedGenerator>) -> PreviewOrchestrator {
    PreviewOrchestrator::spawn(
        generator.clone(),
        &config(),
        Target::default(),
        "getUser",
        sample_body(),
    )
}

fn grow(body: &Body, name: &str) -> Body {
    tree::insert(body, None, Node::identifier(name), None)
}

#[tokio::test(start_paused = true)]
async fn first_render_is_debounced_and_picks_handler_file() {
    let generator = ScriptedGenerator::new().into_shared();
    let preview = spawn(&generator);

    sleep(ms(99)).await;
    assert_eq!(generator.request_count(), 0);
    assert!(preview.state().loading);

    sleep(SETTLE).await;
    let state = preview.state();
    assert_eq!(generator.request_count(), 1);
    assert!(!state.loading);
    assert_eq!(state.applied_seq, 1);
    assert_eq!(state.display.file(), Some("handlers/getUser.ts"));
    assert_eq!(
        state.display.text(),
        Some("// typescript/express #1 getUser (7 nodes)")
    );
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_issues_one_request() {
    let generator = ScriptedGenerator::new().into_shared();
    let preview = spawn(&generator);
    sleep(SETTLE).await;

    let mut body = sample_body();
    for step in 0..5 {
        body = grow(&body, &format!("v{step}"));
        preview.tree_changed(body.clone());
        sleep(ms(60)).await;
    }
    assert_eq!(generator.request_count(), 1);

    sleep(SETTLE).await;
    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].body, body);
    assert_eq!(preview.state().applied_seq, 2);
}

#[tokio::test(start_paused = true)]
async fn late_answer_to_older_request_is_discarded() {
    let generator = ScriptedGenerator::new()
        .then_source(ms(500), "first")
        .then_source(ms(50), "second")
        .into_shared();
    let preview = spawn(&generator);

    // seq 1 goes out at t=100 and answers at t=600
    sleep(ms(150)).await;
    preview.tree_changed(grow(&sample_body(), "x"));

    // seq 2 goes out at t=250 and answers at t=300
    sleep(ms(250)).await;
    assert_eq!(generator.request_count(), 2);
    assert_eq!(preview.state().display.text(), Some("second"));

    sleep(SETTLE).await;
    let state = preview.state();
    assert_eq!(state.display.text(), Some("second"));
    assert_eq!(state.applied_seq, 2);
    assert!(!state.loading);
}

#[tokio::test(start_paused = true)]
async fn superseded_answer_is_dropped_even_when_it_lands_first() {
    let generator = ScriptedGenerator::new()
        .then_source(ms(300), "first")
        .then_source(ms(500), "second")
        .into_shared();
    let preview = spawn(&generator);

    // seq 1 out at t=100, answers t=400; seq 2 out at t=220, answers t=720
    sleep(ms(120)).await;
    preview.tree_changed(grow(&sample_body(), "x"));

    sleep(ms(380)).await;
    let state = preview.state();
    assert_eq!(state.display, PreviewDisplay::Empty);
    assert!(state.loading);
    assert_eq!(state.issued_seq, 2);

    sleep(SETTLE).await;
    assert_eq!(preview.state().display.text(), Some("second"));
}

#[tokio::test(start_paused = true)]
async fn failure_shows_placeholder_until_retry_succeeds() {
    let generator = ScriptedGenerator::new()
        .then_fail(ms(10), GeneratorError::Unavailable("backend restarting".into()))
        .into_shared();
    let preview = spawn(&generator);

    sleep(SETTLE).await;
    let state = preview.state();
    assert!(state.display.is_error());
    assert!(!state.loading);

    preview.retry();
    sleep(SETTLE).await;
    let state = preview.state();
    assert_eq!(generator.request_count(), 2);
    assert_eq!(state.display.file(), Some("handlers/getUser.ts"));
}

#[tokio::test(start_paused = true)]
async fn crashed_generator_shows_placeholder_instead_of_spinning() {
    let generator = ScriptedGenerator::new()
        .then_panic(ms(10), "generator bug")
        .into_shared();
    let preview = spawn(&generator);

    sleep(SETTLE).await;
    let state = preview.state();
    assert!(!state.loading);
    assert_eq!(state.applied_seq, 1);
    assert!(
        matches!(&state.display, PreviewDisplay::Error(message) if message.contains("generator unavailable"))
    );
    assert!(preview.is_running());

    preview.retry();
    sleep(SETTLE).await;
    assert_eq!(preview.state().display.file(), Some("handlers/getUser.ts"));
}

#[tokio::test(start_paused = true)]
async fn switching_target_issues_exactly_one_request() {
    let generator = ScriptedGenerator::new().into_shared();
    let preview = spawn(&generator);
    sleep(SETTLE).await;
    assert_eq!(generator.request_count(), 1);

    let axum = Target::parse("rust/axum").unwrap();
    preview.set_target(axum);
    assert_eq!(generator.request_count(), 1);

    sleep(SETTLE).await;
    let requests = generator.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].target, axum);
    assert_eq!(requests[1].body, requests[0].body);

    let state = preview.state();
    assert_eq!(state.target, axum);
    assert_eq!(state.display.file(), Some("handlers/getUser.rs"));
}

#[tokio::test(start_paused = true)]
async fn target_switch_falls_back_to_first_file() {
    let mut files = IndexMap::new();
    files.insert("cmd/server.go".to_string(), "package main".to_string());
    files.insert("internal/routes.go".to_string(), "package internal".to_string());
    let generator = ScriptedGenerator::new()
        .then_echo(Duration::ZERO)
        .then(Duration::ZERO, Reply::Output(PreviewOutput::Files(files)))
        .into_shared();
    let preview = spawn(&generator);
    sleep(SETTLE).await;

    preview.set_target(Target::parse("go/chi").unwrap());
    sleep(SETTLE).await;
    let state = preview.state();
    assert_eq!(state.display.file(), Some("cmd/server.go"));
    assert_eq!(state.display.text(), Some("package main"));
}

#[tokio::test(start_paused = true)]
async fn unchanged_inputs_do_not_regenerate() {
    let generator = ScriptedGenerator::new().into_shared();
    let preview = spawn(&generator);
    sleep(SETTLE).await;

    preview.set_target(Target::default());
    preview.tree_changed(sample_body_like(&generator));
    preview.set_artifact_name("getUser");
    sleep(SETTLE).await;
    assert_eq!(generator.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn rename_regenerates_and_reselects() {
    let generator = ScriptedGenerator::new().into_shared();
    let preview = spawn(&generator);
    sleep(SETTLE).await;

    preview.set_artifact_name("fetchUser");
    sleep(SETTLE).await;
    assert_eq!(generator.request_count(), 2);
    assert_eq!(preview.state().display.file(), Some("handlers/fetchUser.ts"));
}

/// The exact tree the generator last saw; a fresh `sample_body()` would
/// carry new ids and compare unequal.
fn sample_body_like(generator: &ScriptedGenerator) -> Body {
    generator.requests()[0].body.clone()
}
