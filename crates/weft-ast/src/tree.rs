//! Structural tree engine
//!
//! Pure operations over a [`Body`] addressed only by [`NodeId`]. Every call is
//! a full depth-first walk over container slots, singular child fields, and
//! nested plain objects; no parent pointers or paths are kept between edits.
//!
//! # Forgiving contract
//!
//! None of these functions fail. An id that cannot be located, or a parent
//! with no container slot, leaves the tree unchanged. Callers racing a stale
//! snapshot get a no-op, never a panic or an error.
//!
//! Returned bodies share every untouched branch with the input; only the
//! spine leading to the edit is rebuilt.

use crate::id::NodeId;
use crate::node::{is_reserved, Node};
use crate::value::Value;
use im::Vector;
use std::collections::HashSet;

/// Top-level ordered sequence of root nodes (the handler body)
pub type Body = Vector<Node>;

/// Result of visiting a node during a rewrite
enum Outcome {
    /// Node untouched; keep walking siblings
    Unchanged,
    /// Node deleted from its container (or nulled in a singular field)
    Removed,
    /// Node replaced by a new version
    Replaced(Node),
}

/// Per-node decision: `None` descends into the node, `Some` stops there
type Edit<'e> = dyn FnMut(&Node) -> Option<Outcome> + 'e;

/// Locate a node anywhere in `body`
///
/// Absence is a valid answer, not an error.
#[must_use]
pub fn find<'a>(body: &'a Body, id: &NodeId) -> Option<&'a Node> {
    body.iter().find_map(|node| find_in_node(node, id))
}

/// Whether `id` is present anywhere in `body`
#[inline]
#[must_use]
pub fn contains(body: &Body, id: &NodeId) -> bool {
    find(body, id).is_some()
}

/// Insert `node` under `parent` (or at top level when `parent` is `None`)
///
/// - Top level: inserted at `index`, default append.
/// - Under a parent: inserted into the parent's
///   [`insertion_slot`](Node::insertion_slot) at `index`, default append.
///   A parent without a slot leaves the tree unchanged.
/// - An unknown parent leaves the tree unchanged.
///
/// Indexes past the end append. A node whose subtree reuses an id already
/// in `body` is refused, keeping ids unique.
#[must_use]
pub fn insert(body: &Body, parent: Option<&NodeId>, node: Node, index: Option<usize>) -> Body {
    if let Some(clash) = first_shared_id(body, &Value::from(node.clone()), None) {
        tracing::warn!(id = %clash, "refusing insert that would duplicate a node id");
        return body.clone();
    }

    let Some(parent_id) = parent else {
        let mut next = body.clone();
        let at = index.map_or(next.len(), |i| i.min(next.len()));
        next.insert(at, node);
        return next;
    };

    let mut pending = Some(node);
    let rewritten = rewrite_body(body, &mut |candidate: &Node| {
        if candidate.id() != parent_id {
            return None;
        }
        let Some(slot) = candidate.insertion_slot() else {
            tracing::debug!(parent = %parent_id, kind = %candidate.kind(), "parent has no container slot");
            return Some(Outcome::Unchanged);
        };
        let child = pending.take()?;
        Some(Outcome::Replaced(candidate.with_child_inserted(slot, child, index)))
    });

    rewritten.unwrap_or_else(|| {
        tracing::trace!(parent = %parent_id, "insert left tree unchanged");
        body.clone()
    })
}

/// Delete the node `id` and its whole subtree
///
/// Inside a container slot or at top level the node is removed from the
/// sequence; in a singular field it is replaced with [`Value::Null`].
/// Unknown ids are a no-op.
#[must_use]
pub fn remove(body: &Body, id: &NodeId) -> Body {
    rewrite_body(body, &mut |candidate: &Node| {
        (candidate.id() == id).then_some(Outcome::Removed)
    })
    .unwrap_or_else(|| {
        tracing::trace!(id = %id, "remove found nothing");
        body.clone()
    })
}

/// Replace field `key` on node `id`, leaving everything else untouched
///
/// Unknown ids are a no-op, as are the header keys `id`, `type`, and `tier`,
/// which are not fields. A value holding a node whose id is already used
/// outside the replaced field is refused, as [`insert`] does.
#[must_use]
pub fn update_property(body: &Body, id: &NodeId, key: &str, value: Value) -> Body {
    if is_reserved(key) {
        tracing::debug!(id = %id, key, "ignoring update of node header key");
        return body.clone();
    }
    let Some(target) = find(body, id) else {
        tracing::trace!(id = %id, key, "update found nothing");
        return body.clone();
    };
    if let Some(clash) = first_shared_id(body, &value, target.get(key)) {
        tracing::warn!(id = %id, key, clash = %clash, "refusing update that would duplicate a node id");
        return body.clone();
    }

    let mut pending = Some(value);
    rewrite_body(body, &mut |candidate: &Node| {
        if candidate.id() != id {
            return None;
        }
        let value = pending.take()?;
        Some(Outcome::Replaced(candidate.with_field(key, value)))
    })
    .unwrap_or_else(|| {
        tracing::trace!(id = %id, key, "update found nothing");
        body.clone()
    })
}

/// Visit every node depth-first with its depth (roots are depth 0)
pub fn walk<'a>(body: &'a Body, visit: &mut dyn FnMut(&'a Node, usize)) {
    fn walk_node<'a>(node: &'a Node, depth: usize, visit: &mut dyn FnMut(&'a Node, usize)) {
        visit(node, depth);
        for child in node.children() {
            walk_node(child, depth + 1, visit);
        }
    }
    for node in body {
        walk_node(node, 0, visit);
    }
}

/// Every id in `body`, depth-first
#[must_use]
pub fn ids(body: &Body) -> Vec<NodeId> {
    let mut out = Vec::new();
    walk(body, &mut |node, _| out.push(node.id().clone()));
    out
}

// ----------------------------------------------------------------------
// Search
// ----------------------------------------------------------------------

fn find_in_node<'a>(node: &'a Node, id: &NodeId) -> Option<&'a Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children().find_map(|child| find_in_node(child, id))
}

/// First id carried by `incoming` that is repeated within it or already used
/// in `body` outside `replaced`
fn first_shared_id(body: &Body, incoming: &Value, replaced: Option<&Value>) -> Option<NodeId> {
    let mut arriving = HashSet::new();
    if let Some(repeat) = collect_ids(incoming, &mut arriving) {
        return Some(repeat);
    }
    let mut leaving = HashSet::new();
    if let Some(old) = replaced {
        collect_ids(old, &mut leaving);
    }

    let mut clash = None;
    walk(body, &mut |existing, _| {
        let id = existing.id();
        if clash.is_none() && arriving.contains(id) && !leaving.contains(id) {
            clash = Some(id.clone());
        }
    });
    clash
}

/// Add every node id inside `value` to `seen`; returns the first repeat
fn collect_ids(value: &Value, seen: &mut HashSet<NodeId>) -> Option<NodeId> {
    let mut repeat = None;
    for node in value.child_nodes() {
        if !seen.insert(node.id().clone()) && repeat.is_none() {
            repeat = Some(node.id().clone());
        }
        for field in node.fields().values() {
            if let Some(id) = collect_ids(field, seen) {
                repeat.get_or_insert(id);
            }
        }
    }
    repeat
}

// ----------------------------------------------------------------------
// Rewrite
// ----------------------------------------------------------------------

/// Apply `edit` to the first node it claims; `None` if nothing changed
fn rewrite_body(body: &Body, edit: &mut Edit<'_>) -> Option<Body> {
    for (index, node) in body.iter().enumerate() {
        match rewrite_node(node, edit) {
            Outcome::Unchanged => continue,
            Outcome::Removed => {
                let mut next = body.clone();
                next.remove(index);
                return Some(next);
            }
            Outcome::Replaced(replacement) => {
                let mut next = body.clone();
                next.set(index, replacement);
                return Some(next);
            }
        }
    }
    None
}

fn rewrite_node(node: &Node, edit: &mut Edit<'_>) -> Outcome {
    if let Some(outcome) = edit(node) {
        return outcome;
    }
    for (key, value) in node.fields() {
        if let Some(next) = rewrite_value(value, edit) {
            return Outcome::Replaced(node.with_field(key, next));
        }
    }
    Outcome::Unchanged
}

fn rewrite_value(value: &Value, edit: &mut Edit<'_>) -> Option<Value> {
    match value {
        Value::Node(child) => match rewrite_node(child, edit) {
            Outcome::Unchanged => None,
            Outcome::Removed => Some(Value::Null),
            Outcome::Replaced(replacement) => Some(Value::from(replacement)),
        },
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                let change = match item {
                    Value::Node(child) => match rewrite_node(child, edit) {
                        Outcome::Unchanged => None,
                        Outcome::Removed => Some(None),
                        Outcome::Replaced(replacement) => Some(Some(Value::from(replacement))),
                    },
                    other => rewrite_value(other, edit).map(Some),
                };
                if let Some(change) = change {
                    let mut next = items.clone();
                    match change {
                        Some(replacement) => {
                            next.set(index, replacement);
                        }
                        None => {
                            next.remove(index);
                        }
                    }
                    return Some(Value::List(next));
                }
            }
            None
        }
        Value::Object(entries) => entries.iter().find_map(|(key, entry)| {
            rewrite_value(entry, edit).map(|next| Value::Object(entries.update(key.clone(), next)))
        }),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{NodeKind, Tier};
    use pretty_assertions::assert_eq;

    fn sample() -> (Body, Node, Node) {
        let query = Node::db_query("User", "findMany");
        let guard = Node::if_statement(Some(Node::identifier("isAdmin")), vec![query.clone()]);
        let body = im::vector![Node::let_statement("limit", Some(Node::literal(10_i64))), guard.clone()];
        (body, guard, query)
    }

    #[test]
    fn let_at_top_level_of_empty_body() {
        let node = Node::new(NodeKind::LetStatement);
        let body = insert(&Body::new(), None, node.clone(), None);
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].type_name(), "LetStatement");
        assert_eq!(body[0].tier(), Tier::Universal);
        assert_eq!(body[0].id(), node.id());
    }

    #[test]
    fn top_level_insert_respects_index() {
        let (body, guard, _) = sample();
        let first = Node::new(NodeKind::ReturnStatement);
        let body = insert(&body, None, first.clone(), Some(0));
        assert_eq!(body[0].id(), first.id());
        assert_eq!(body[2].id(), guard.id());

        let last = Node::new(NodeKind::ThrowStatement);
        let body = insert(&body, None, last.clone(), Some(99));
        assert_eq!(body.last().map(Node::id), Some(last.id()));
    }

    #[test]
    fn insert_under_parent_uses_priority_slot() {
        let (body, guard, query) = sample();
        let respond = Node::http_respond(200, None);
        let body = insert(&body, Some(guard.id()), respond.clone(), Some(0));

        let updated = find(&body, guard.id()).unwrap();
        let slot: Vec<_> = updated.slot("body").into_iter().map(|n| n.id().clone()).collect();
        assert_eq!(slot, vec![respond.id().clone(), query.id().clone()]);
        assert!(updated.slot("elseBody").is_empty());
    }

    #[test]
    fn insert_into_nested_parent() {
        let (body, _, _) = sample();
        let call = Node::call(Node::identifier("log"), vec![]);
        let body = insert(&body, None, call.clone(), None);
        let arg = Node::literal("hello");
        let body = insert(&body, Some(call.id()), arg.clone(), None);

        let parent = find(&body, call.id()).unwrap();
        assert_eq!(parent.slot("arguments")[0].id(), arg.id());
    }

    #[test]
    fn insert_into_slotless_parent_is_noop() {
        let (body, _, _) = sample();
        let respond = Node::http_respond(200, None);
        let body = insert(&body, None, respond.clone(), None);

        let after = insert(&body, Some(respond.id()), Node::identifier("x"), None);
        assert_eq!(after, body);
    }

    #[test]
    fn insert_under_unknown_parent_is_noop() {
        let (body, _, _) = sample();
        let after = insert(&body, Some(&NodeId::from("ghost")), Node::identifier("x"), None);
        assert_eq!(after, body);
    }

    #[test]
    fn insert_refuses_duplicate_ids() {
        let (body, _, query) = sample();
        let after = insert(&body, None, query, None);
        assert_eq!(after, body);
    }

    #[test]
    fn remove_parent_removes_subtree() {
        let (body, guard, query) = sample();
        let body = remove(&body, guard.id());
        assert_eq!(body.len(), 1);
        assert!(find(&body, guard.id()).is_none());
        assert!(find(&body, query.id()).is_none());
    }

    #[test]
    fn remove_in_slot_and_singular_field() {
        let (body, guard, query) = sample();
        let body = remove(&body, query.id());
        assert!(find(&body, guard.id()).unwrap().slot("body").is_empty());

        let condition = guard.child("condition").unwrap().id().clone();
        let body = remove(&body, &condition);
        let guard_after = find(&body, guard.id()).unwrap();
        assert_eq!(guard_after.get("condition"), Some(&Value::Null));
    }

    #[test]
    fn remove_is_idempotent() {
        let (body, guard, _) = sample();
        let once = remove(&body, guard.id());
        assert_eq!(remove(&once, guard.id()), once);
    }

    #[test]
    fn update_property_touches_one_field() {
        let (body, guard, query) = sample();
        let body = update_property(&body, query.id(), "model", Value::from("Post"));

        let updated = find(&body, query.id()).unwrap();
        assert_eq!(updated.get("model").and_then(Value::as_str), Some("Post"));
        assert_eq!(updated.get("operation").and_then(Value::as_str), Some("findMany"));
        assert_eq!(
            find(&body, guard.id()).unwrap().child("condition"),
            guard.child("condition")
        );
    }

    #[test]
    fn update_property_ignores_header_keys_and_misses() {
        let (body, _, query) = sample();
        assert_eq!(update_property(&body, query.id(), "tier", Value::from(3_i64)), body);
        assert_eq!(update_property(&body, query.id(), "id", Value::from("x")), body);
        assert_eq!(
            update_property(&body, &NodeId::from("ghost"), "model", Value::Null),
            body
        );
    }

    #[test]
    fn update_property_refuses_ids_already_in_tree() {
        let (body, guard, query) = sample();
        let limit = body[0].id().clone();
        let after = update_property(&body, &limit, "value", Value::from(query.clone()));
        assert_eq!(after, body);
        assert!(crate::duplicate_ids(&after).is_empty());

        let after = update_property(&body, &limit, "value", Value::from(guard));
        assert_eq!(after, body);
    }

    #[test]
    fn update_property_may_reuse_ids_of_the_replaced_field() {
        let (body, guard, query) = sample();
        let moved = query.with_field("model", Value::from("Post"));
        let after = update_property(&body, guard.id(), "body", Value::from(vec![moved.clone()]));
        assert_eq!(find(&after, query.id()), Some(&moved));
        assert!(crate::duplicate_ids(&after).is_empty());
    }

    #[test]
    fn edits_share_untouched_branches() {
        let (body, guard, query) = sample();
        let edited = update_property(&body, query.id(), "model", Value::from("Post"));
        assert_eq!(edited[0], body[0]);
        assert_ne!(edited[1], body[1]);
        assert_eq!(find(&body, guard.id()).unwrap(), &guard);
    }

    #[test]
    fn nodes_inside_plain_objects_are_reachable() {
        let inner = Node::identifier("deep");
        let holder = Node::new(NodeKind::NativeBridge).with(
            "bindings",
            Value::Object(im::OrdMap::unit("x".to_string(), Value::from(inner.clone()))),
        );
        let body = im::vector![holder];
        assert!(contains(&body, inner.id()));
        let body = remove(&body, inner.id());
        assert!(!contains(&body, inner.id()));
    }

    #[test]
    fn walk_reports_depths() {
        let (body, _, _) = sample();
        let mut depths = Vec::new();
        walk(&body, &mut |node, depth| depths.push((node.kind(), depth)));
        assert_eq!(
            depths,
            vec![
                (NodeKind::LetStatement, 0),
                (NodeKind::Literal, 1),
                (NodeKind::IfStatement, 0),
                (NodeKind::DbQuery, 1),
                (NodeKind::Identifier, 1),
            ]
        );
    }
}
