//! Weft Preview - continuous code preview for handler trees
//!
//! Keeps one "rendered source for (language, framework)" value consistent
//! with the latest tree while the external generator answers slowly and
//! out of order.
//!
//! ## Pieces
//!
//! - [`Target`]: the fixed language/framework catalog
//! - [`CodeGenerator`]: async seam to the external generator
//! - [`PreviewScheduler`]: pure debounce and latest-wins state machine
//! - [`PreviewOrchestrator`]: tokio driver publishing [`PreviewState`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use weft_preview::{PreviewConfig, PreviewOrchestrator, Target};
//!
//! let preview = PreviewOrchestrator::spawn(generator, &PreviewConfig::default(), "getUser", body);
//! preview.set_target(Target::parse("rust/axum")?);
//! let mut states = preview.subscribe();
//! states.changed().await?;
//! ```

#![recursion_limit = "256"]
#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod generator;
mod orchestrator;
mod scheduler;
mod select;
mod target;

pub use error::{GeneratorError, TargetError};
pub use generator::{CodeGenerator, PreviewOutput, PreviewRequest};
pub use orchestrator::{PreviewConfig, PreviewDisplay, PreviewOrchestrator, PreviewState};
pub use scheduler::{Phase, PreviewScheduler, Seq, Verdict};
pub use select::{display_for, pick_display_file};
pub use target::{Framework, Language, Target};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
