//! Algebraic laws of the tree engine.
//!
//! Trees are grown by replaying random insert scripts, so every generated
//! tree is itself a product of the engine under test.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use weft_ast::{tree, Body, Node, NodeId, NodeKind, Value};

/// One step of a build script: which kind to create and which existing node
/// (by position in the id list) to hang it under, if any.
type Step = (usize, Option<usize>);

fn build(script: &[Step]) -> Body {
    let mut body = Body::new();
    for &(kind_index, parent_pick) in script {
        let node = Node::new(NodeKind::ALL[kind_index % NodeKind::ALL.len()]);
        let ids = tree::ids(&body);
        let parent = parent_pick
            .filter(|_| !ids.is_empty())
            .map(|pick| ids[pick % ids.len()].clone());
        body = tree::insert(&body, parent.as_ref(), node, None);
    }
    body
}

/// Plain object that may borrow node header keys, as query filters do
fn plain_object() -> impl Strategy<Value = Value> {
    (
        prop_oneof![Just("eq".to_string()), Just("DbQuery".to_string()), "[a-z]{1,6}"],
        proptest::option::of(0..4i64),
        proptest::option::of("[a-z0-9]{4}"),
    )
        .prop_map(|(kind, tier, id)| {
            let mut map = im::OrdMap::new();
            map.insert("type".to_string(), Value::from(kind));
            if let Some(tier) = tier {
                map.insert("tier".to_string(), Value::from(tier));
            }
            if let Some(id) = id {
                map.insert("id".to_string(), Value::from(id));
            }
            Value::Object(map)
        })
}

fn script() -> impl Strategy<Value = Vec<Step>> {
    proptest::collection::vec((0..NodeKind::ALL.len(), proptest::option::of(0..64usize)), 0..40)
}

proptest! {
    #[test]
    fn misses_leave_tree_untouched(steps in script(), ghost in "[a-z]{12}") {
        let body = build(&steps);
        let ghost = NodeId::from(format!("ghost-{ghost}"));

        prop_assert!(tree::find(&body, &ghost).is_none());
        prop_assert_eq!(tree::remove(&body, &ghost), body.clone());
        prop_assert_eq!(
            tree::update_property(&body, &ghost, "name", Value::from("x")),
            body.clone()
        );
        prop_assert_eq!(
            tree::insert(&body, Some(&ghost), Node::identifier("x"), None),
            body
        );
    }

    #[test]
    fn inserted_node_is_found_under_slotted_parent(steps in script(), pick in 0..64usize) {
        let body = build(&steps);
        let parents: Vec<NodeId> = tree::ids(&body)
            .into_iter()
            .filter(|id| tree::find(&body, id).and_then(Node::insertion_slot).is_some())
            .collect();
        prop_assume!(!parents.is_empty());

        let parent = &parents[pick % parents.len()];
        let child = Node::return_statement(None);
        let grown = tree::insert(&body, Some(parent), child.clone(), None);
        prop_assert_eq!(tree::find(&grown, child.id()), Some(&child));
    }

    #[test]
    fn removal_is_idempotent(steps in script(), pick in 0..64usize) {
        let body = build(&steps);
        let ids = tree::ids(&body);
        prop_assume!(!ids.is_empty());

        let id = &ids[pick % ids.len()];
        let once = tree::remove(&body, id);
        prop_assert!(tree::find(&once, id).is_none());
        prop_assert_eq!(tree::remove(&once, id), once);
    }

    #[test]
    fn json_round_trip_preserves_everything(
        steps in script(),
        filters in proptest::collection::vec((0..64usize, plain_object()), 0..6),
    ) {
        let mut body = build(&steps);
        let ids = tree::ids(&body);
        if !ids.is_empty() {
            for (pick, filter) in filters {
                body = tree::update_property(&body, &ids[pick % ids.len()], "filter", filter);
            }
        }
        let encoded = serde_json::to_string(&body.iter().collect::<Vec<_>>()).unwrap();
        let decoded: Vec<Node> = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(decoded.into_iter().collect::<Body>(), body);
    }

    #[test]
    fn ids_stay_unique(steps in script()) {
        let body = build(&steps);
        prop_assert!(weft_ast::duplicate_ids(&body).is_empty());
    }
}

#[test]
fn db_query_under_if_then_remove_if() {
    let guard = Node::new(NodeKind::IfStatement);
    let body = tree::insert(&Body::new(), None, guard.clone(), None);

    let query = Node::new(NodeKind::DbQuery);
    assert_eq!(query.tier().as_u8(), 1);
    let body = tree::insert(&body, Some(guard.id()), query.clone(), None);
    assert_eq!(tree::find(&body, guard.id()).unwrap().slot("body").len(), 1);

    let body = tree::remove(&body, guard.id());
    assert!(body.is_empty());
    assert!(tree::find(&body, query.id()).is_none());
}

#[test]
fn old_snapshot_survives_edits() {
    let guard = Node::if_statement(None, vec![Node::identifier("a")]);
    let before: Body = im::vector![guard.clone()];
    let after = tree::insert(&before, Some(guard.id()), Node::identifier("b"), None);

    assert_eq!(before[0].slot("body").len(), 1);
    assert_eq!(after[0].slot("body").len(), 2);
}

#[test]
fn stored_document_body_decodes() {
    let json = serde_json::json!([
        {
            "id": "n1",
            "type": "TryCatchStatement",
            "tier": 0,
            "tryBody": [
                { "id": "n2", "type": "DbMutate", "tier": 1, "model": "User", "operation": "create",
                  "data": { "id": "n3", "type": "CtxGet", "tier": 1, "source": "body", "key": "user" },
                  "filter": null }
            ],
            "catchParam": "err",
            "catchBody": [
                { "id": "n4", "type": "HttpRespond", "tier": 1, "status": 500, "body": null }
            ]
        }
    ]);
    let nodes: Vec<Node> = serde_json::from_value(json.clone()).unwrap();
    let body: Body = nodes.into_iter().collect();

    assert_eq!(tree::ids(&body).len(), 4);
    assert_eq!(
        tree::find(&body, &NodeId::from("n3")).map(Node::kind),
        Some(NodeKind::CtxGet)
    );
    assert_eq!(serde_json::to_value(body.iter().collect::<Vec<_>>()).unwrap(), json);
}
