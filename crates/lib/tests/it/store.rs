//! InMemory store integration tests
//!
//! Query semantics over tree-shaped data and JSON file persistence.

use ancestry::store::{Comparison, Filter, Query, SortOrder};
use ancestry::{ID, InMemory, NodeStore, TreePolicy};
use tempfile::tempdir;

use crate::helpers::*;

#[test]
fn test_path_within_is_segment_aware() {
    let (store, tree) = setup_tree(TreePolicy::default());
    let nodes = build_forest(&tree);

    let prefix = nodes["a"].child_prefix().unwrap();
    let within: Vec<String> = store
        .find(&Query::new().filter(Filter::PathWithin(prefix)))
        .unwrap()
        .into_iter()
        .map(|r| r.data.name)
        .collect();
    assert_eq!(within, vec!["a1", "a2", "a2x"]);

    let roots = store
        .count(&Query::new().filter(Filter::PathEq(ancestry::AncestryPath::root())))
        .unwrap();
    assert_eq!(roots, 2);
}

#[test]
fn test_any_filter_is_disjunction() {
    let (store, tree) = setup_tree(TreePolicy::default());
    let nodes = build_forest(&tree);

    let query = Query::new().filter(Filter::Any(vec![
        Filter::IdEq(id_of(&nodes["b"])),
        Filter::IdEq(id_of(&nodes["r2"])),
    ]));
    assert_eq!(store.count(&query).unwrap(), 2);

    let none = Query::new().filter(Filter::Any(vec![]));
    assert_eq!(store.count(&none).unwrap(), 0);
}

#[test]
fn test_position_order_breaks_ties_by_insertion() {
    let (store, tree) = setup_tree(TreePolicy::default());
    let first = add(&tree, "first", None);
    let second = add(&tree, "second", None);
    store
        .increment(&id_of(&first), ancestry::store::NumericField::Position, 1)
        .unwrap();

    let ordered: Vec<ID> = store
        .find(&Query::new().order_by(SortOrder::Position))
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ordered, vec![id_of(&second), id_of(&first)]);

    let at_one = Query::new().filter(Filter::Position(Comparison::Eq, 1));
    assert_eq!(store.find(&at_one).unwrap()[0].id, id_of(&first));
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let file = dir.path().join("nodes.json");

    let (store, tree) = setup_ordered(TreePolicy::new().with_cache_depth(true));
    let root = add_ordered(&tree, "root", None);
    let child = add_ordered(&tree, "child", Some(&root));
    add_ordered(&tree, "sibling", Some(&root));
    store.save_to_file(&file).expect("Failed to save store");

    let loaded = std::sync::Arc::new(
        InMemory::<Label>::load_from_file(&file).expect("Failed to load store"),
    );
    assert_eq!(loaded.len().unwrap(), 3);
    assert_eq!(loaded.all_ids().unwrap(), store.all_ids().unwrap());

    let record = loaded
        .find_by_id(&id_of(&child))
        .unwrap()
        .expect("Child should survive the round trip");
    assert_eq!(record.ancestry, child.path().clone());
    assert_eq!(record.ancestry_depth, 1);
    assert_eq!(record.position, 0);
    assert_eq!(record.data, label("child"));

    let reopened = ancestry::OrderedTree::new(loaded, TreePolicy::new().with_cache_depth(true));
    assert_eq!(
        group(&reopened, Some(&root)),
        expected(&["child", "sibling"])
    );
}

#[test]
fn test_persisted_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    let file = dir.path().join("nodes.json");

    let (store, tree) = setup_tree(TreePolicy::default());
    let root = add(&tree, "root", None);
    add(&tree, "child", Some(&root));
    store.save_to_file(&file).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    // v0 omits the version marker
    assert!(json.get("_v").is_none());
    let nodes = json["nodes"].as_array().unwrap();
    assert!(nodes[0]["ancestry"].is_null());
    assert_eq!(nodes[1]["ancestry"], serde_json::json!(id_of(&root).to_string()));
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = InMemory::<Label>::load_from_file(dir.path().join("absent.json")).unwrap();
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_load_rejects_bad_files() {
    let dir = tempdir().expect("Failed to create temp dir");

    let future = dir.path().join("future.json");
    std::fs::write(&future, r#"{"_v": 7, "nodes": []}"#).unwrap();
    let err = InMemory::<Label>::load_from_file(&future).unwrap_err();
    assert!(err.is_serialization_error());

    let bad_path = dir.path().join("bad_path.json");
    std::fs::write(
        &bad_path,
        r#"{"nodes": [{"id": "x", "ancestry": "a//b", "data": {"name": "x"}}]}"#,
    )
    .unwrap();
    let err = InMemory::<Label>::load_from_file(&bad_path).unwrap_err();
    assert!(err.is_serialization_error());
}

#[test]
fn test_load_defaults_missing_tree_fields() {
    let dir = tempdir().expect("Failed to create temp dir");
    let file = dir.path().join("minimal.json");
    std::fs::write(
        &file,
        r#"{"nodes": [{"id": "r", "ancestry": null, "data": {"name": "r"}},
                      {"id": "c", "ancestry": "r", "data": {"name": "c"}}]}"#,
    )
    .unwrap();

    let store = InMemory::<Label>::load_from_file(&file).unwrap();
    let child = store.find_by_id(&ID::from("c")).unwrap().unwrap();
    assert_eq!(child.position, 0);
    assert_eq!(child.ancestry_depth, 0);
    assert_eq!(child.ancestry.ids(), &[ID::from("r")]);
}
