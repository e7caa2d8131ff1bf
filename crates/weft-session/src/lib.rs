//! weft Session
//!
//! State for one open handler-editing session.
//!
//! # Core Concepts
//!
//! - [`HandlerSpec`]: The persisted document (metadata plus a `body` tree)
//! - [`Selection`]: Which node, if any, is focused
//! - [`DirtyTracker`]: Clean/Dirty state machine driven by edit revisions
//! - [`EditSession`]: Owns the current tree and routes every edit through the
//!   tree engine, selection, and dirty tracking
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_ast::Node;
//! use weft_session::{DocumentId, EditSession, HandlerSpec};
//!
//! let mut session = EditSession::open(DocumentId::new("users/list"), HandlerSpec::new("listUsers"));
//! session.insert(None, Node::db_query("User", "findMany"), None);
//! assert!(session.is_dirty());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod dirty;
mod error;
mod selection;
mod session;
mod spec;

pub use dirty::{transition, DirtyEvent, DirtyState, DirtyTracker, Revision};
pub use error::SpecError;
pub use selection::Selection;
pub use session::{EditSession, Generation, SaveSnapshot};
pub use spec::{DocumentId, HandlerSpec, Param};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
