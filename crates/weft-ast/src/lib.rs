//! weft AST
//!
//! Portable, immutable handler-logic trees and the structural engine that
//! edits them.
//!
//! # Core Concepts
//!
//! - [`Node`]: Tagged value with an opaque [`NodeId`], a [`NodeKind`] discriminator,
//!   a portability [`Tier`], and free-form fields
//! - [`Value`]: Field payload; a `Value::Node` is a singular child, a `Value::List`
//!   of nodes is a container slot
//! - [`Body`]: Top-level ordered sequence of root nodes (the handler body)
//! - [`tree`]: Pure `find` / `insert` / `remove` / `update_property` over a [`Body`]
//! - [`TreeStats`]: Portability summary of a body
//!
//! Trees are persistent: every edit returns a new [`Body`] and unaffected
//! branches are shared with the previous one.
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_ast::{tree, Body, Node, NodeKind};
//!
//! let guard = Node::new(NodeKind::IfStatement);
//! let body = tree::insert(&Body::new(), None, guard.clone(), None);
//!
//! let query = Node::db_query("User", "findMany");
//! let body = tree::insert(&body, Some(guard.id()), query.clone(), None);
//! assert!(tree::find(&body, query.id()).is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod codec;
mod error;
mod id;
mod kind;
mod node;
mod stats;
pub mod tree;
mod value;

pub use error::NodeError;
pub use id::NodeId;
pub use kind::{Category, NodeKind, Tier};
pub use node::{Node, RESERVED_KEYS, SLOT_PRIORITY};
pub use stats::{duplicate_ids, TreeStats};
pub use tree::Body;
pub use value::Value;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
