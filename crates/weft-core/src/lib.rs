//! weft Core - editor façade over the AST, session, and preview crates
//!
//! Provides:
//! - [`Editor`]: one open handler with edits, selection, saving, and preview
//! - [`DocumentStore`]: whole-document persistence boundary
//! - [`EditorConfig`]: TOML configuration
//! - [`Palette`] and [`RendererRegistry`]: what the canvas offers and shows
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_core::{Editor, EditorConfig, MemoryStore};
//!
//! let editor = Editor::open(&EditorConfig::default(), store, generator, "users/create".into()).await?;
//! let guard = editor.insert_from_palette(None, "if")?;
//! editor.insert_from_palette(Some(&guard), "db-query")?;
//! editor.save().await?;
//! ```

#![recursion_limit = "256"]
#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod editor;
mod error;
pub mod logging;
mod palette;
mod render;
mod store;

pub use config::{AutosaveConfig, EditorConfig, LoggingConfig};
pub use editor::{Editor, SaveOutcome};
pub use error::{ConfigError, EditorError, StoreError};
pub use palette::{Palette, PaletteEntry};
pub use render::{
    BridgeRenderer, CanvasRow, DomainRenderer, GenericRenderer, NodeRenderer, RendererRegistry,
    StatementRenderer,
};
pub use store::{DocumentStore, FileStore, MemoryStore};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
