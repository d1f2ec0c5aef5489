//! AncestryPath integration tests
//!
//! Paths of real nodes: encoding of store-assigned IDs, child prefixes and
//! the prefix invariant between parents and children.

use ancestry::{AncestryPath, Node, TreePolicy};

use crate::helpers::*;

#[test]
fn test_round_trip_of_stored_paths() {
    let (_store, tree) = setup_tree(TreePolicy::default());
    let chain = build_chain(&tree);

    for node in &chain {
        let encoded = node.path().encode();
        let decoded =
            AncestryPath::decode(encoded.as_deref()).expect("Stored path should decode");
        assert_eq!(&decoded, node.path());
    }

    assert_eq!(chain[0].path().encode(), None);
    let leaf = &chain[3];
    let expected: Vec<String> = chain[..3].iter().map(|n| id_of(n).to_string()).collect();
    assert_eq!(leaf.path().encode(), Some(expected.join("/")));
}

#[test]
fn test_child_prefix_of_parent_matches_child_path() {
    let (_store, tree) = setup_tree(TreePolicy::default());
    let nodes = build_forest(&tree);

    for name in ["a", "a1", "a2", "a2x", "b"] {
        let node = &nodes[name];
        let parent = tree
            .parent(node)
            .expect("Parent lookup failed")
            .expect("Non-root should have a parent");
        assert_eq!(&parent.child_prefix().unwrap(), node.path());
    }
    assert_prefix_invariant(&tree);
}

#[test]
fn test_child_prefix_requires_persisted_node() {
    let node = Node::new(label("transient"));
    let err = node.child_prefix().unwrap_err();
    assert!(err.is_invalid_state());
}

#[test]
fn test_child_prefix_uses_persisted_path() {
    let (_store, tree) = setup_tree(TreePolicy::default());
    let nodes = build_forest(&tree);
    let mut a2 = nodes["a2"].clone();
    let before = a2.child_prefix().unwrap();

    let outcome = tree.set_parent(&mut a2, Some(&nodes["r2"])).unwrap();
    assert!(outcome.is_moved());
    assert!(a2.has_moved());
    // Unsaved move: children are still addressed by the old prefix
    assert_eq!(a2.child_prefix().unwrap(), before);
    assert_eq!(tree.child_ids(&a2).unwrap(), vec![id_of(&nodes["a2x"])]);

    tree.save(&mut a2).unwrap();
    assert_ne!(a2.child_prefix().unwrap(), before);
    assert_eq!(a2.child_prefix().unwrap(), reload(&tree, &nodes["a2x"]).path().clone());
}

#[test]
fn test_malformed_path_is_format_error() {
    let err: ancestry::Error = "a//b".parse::<AncestryPath>().unwrap_err().into();
    assert!(err.is_format_error());
    assert_eq!(err.module(), "path");
}
