use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ancestry::store::{NumericField, Query};
use ancestry::{
    AncestryPath, ID, InMemory, Node, NodeDraft, NodeRecord, NodeStore, OrderedTree, StoreError,
    Tree, TreePolicy,
};
use serde::{Deserialize, Serialize};

/// Document type used by every integration test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

pub fn label(name: &str) -> Label {
    Label {
        name: name.to_string(),
    }
}

// ==========================
// TREE FACTORIES
// ==========================

/// Creates an empty store and a plain tree over it.
pub fn setup_tree(policy: TreePolicy) -> (Arc<InMemory<Label>>, Tree<Label>) {
    let store = Arc::new(InMemory::<Label>::new());
    let tree = Tree::new(store.clone(), policy);
    (store, tree)
}

/// Creates an empty store and an ordered tree over it.
pub fn setup_ordered(policy: TreePolicy) -> (Arc<InMemory<Label>>, OrderedTree<Label>) {
    let store = Arc::new(InMemory::<Label>::new());
    let tree = OrderedTree::new(store.clone(), policy);
    (store, tree)
}

/// Creates a store that can be told to fail writes, and a plain tree over it.
pub fn setup_failing(policy: TreePolicy) -> (Arc<FailingStore>, Tree<Label>) {
    let store = Arc::new(FailingStore::new());
    let tree = Tree::new(store.clone(), policy);
    (store, tree)
}

/// Creates and saves a node.
pub fn add(tree: &Tree<Label>, name: &str, parent: Option<&Node<Label>>) -> Node<Label> {
    tree.create(label(name), parent)
        .expect("Failed to create node")
}

/// Creates and saves a node in an ordered tree.
pub fn add_ordered(
    tree: &OrderedTree<Label>,
    name: &str,
    parent: Option<&Node<Label>>,
) -> Node<Label> {
    tree.create(label(name), parent)
        .expect("Failed to create ordered node")
}

/// Builds `root -> a -> b -> c` and returns the nodes in that order.
pub fn build_chain(tree: &Tree<Label>) -> Vec<Node<Label>> {
    let root = add(tree, "root", None);
    let a = add(tree, "a", Some(&root));
    let b = add(tree, "b", Some(&a));
    let c = add(tree, "c", Some(&b));
    vec![root, a, b, c]
}

/// Builds a small forest and returns every node keyed by name:
///
/// ```text
/// r1
/// ├── a
/// │   ├── a1
/// │   └── a2
/// │       └── a2x
/// └── b
/// r2
/// ```
pub fn build_forest(tree: &Tree<Label>) -> HashMap<&'static str, Node<Label>> {
    let mut nodes = HashMap::new();
    let r1 = add(tree, "r1", None);
    let a = add(tree, "a", Some(&r1));
    let a1 = add(tree, "a1", Some(&a));
    let a2 = add(tree, "a2", Some(&a));
    let a2x = add(tree, "a2x", Some(&a2));
    let b = add(tree, "b", Some(&r1));
    let r2 = add(tree, "r2", None);
    for (name, node) in [
        ("r1", r1),
        ("a", a),
        ("a1", a1),
        ("a2", a2),
        ("a2x", a2x),
        ("b", b),
        ("r2", r2),
    ] {
        nodes.insert(name, node);
    }
    nodes
}

// ==========================
// FAILING STORE
// ==========================

/// In-memory store whose `save` and `destroy` start failing once a budget of
/// successful calls is spent. Budgets are unlimited until set.
pub struct FailingStore {
    inner: InMemory<Label>,
    saves_left: Mutex<Option<usize>>,
    destroys_left: Mutex<Option<usize>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemory::new(),
            saves_left: Mutex::new(None),
            destroys_left: Mutex::new(None),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len().unwrap()
    }

    /// Allow `n` more saves, then fail every later one.
    pub fn fail_saves_after(&self, n: usize) {
        *self.saves_left.lock().unwrap() = Some(n);
    }

    /// Allow `n` more destroys, then fail every later one.
    pub fn fail_destroys_after(&self, n: usize) {
        *self.destroys_left.lock().unwrap() = Some(n);
    }

    fn spend(budget: &Mutex<Option<usize>>, operation: &str) -> ancestry::Result<()> {
        let mut budget = budget.lock().unwrap();
        match *budget {
            Some(0) => Err(StoreError::LockPoisoned {
                reason: format!("injected {operation} failure"),
            }
            .into()),
            Some(n) => {
                *budget = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl NodeStore<Label> for FailingStore {
    fn create(&self, draft: NodeDraft<Label>) -> ancestry::Result<NodeRecord<Label>> {
        self.inner.create(draft)
    }

    fn save(&self, record: &NodeRecord<Label>) -> ancestry::Result<()> {
        Self::spend(&self.saves_left, "save")?;
        self.inner.save(record)
    }

    fn destroy(&self, id: &ID) -> ancestry::Result<bool> {
        Self::spend(&self.destroys_left, "destroy")?;
        self.inner.destroy(id)
    }

    fn find_by_id(&self, id: &ID) -> ancestry::Result<Option<NodeRecord<Label>>> {
        self.inner.find_by_id(id)
    }

    fn find(&self, query: &Query) -> ancestry::Result<Vec<NodeRecord<Label>>> {
        self.inner.find(query)
    }

    fn increment(&self, id: &ID, field: NumericField, delta: i64) -> ancestry::Result<()> {
        self.inner.increment(id, field, delta)
    }
}

// ==========================
// READ HELPERS
// ==========================

pub fn id_of(node: &Node<Label>) -> ID {
    node.id().cloned().expect("Node should be persisted")
}

/// Sorted names of the given nodes.
pub fn sorted_names(nodes: &[Node<Label>]) -> Vec<String> {
    let mut names: Vec<String> = nodes.iter().map(|n| n.data.name.clone()).collect();
    names.sort();
    names
}

/// Names in the order given.
pub fn names(nodes: &[Node<Label>]) -> Vec<String> {
    nodes.iter().map(|n| n.data.name.clone()).collect()
}

/// Fresh copy of a node from the store.
pub fn reload(tree: &Tree<Label>, node: &Node<Label>) -> Node<Label> {
    tree.find(&id_of(node)).expect("Failed to reload node")
}

/// `(name, position)` of the children of `parent` (roots when `None`), in position order.
pub fn group(tree: &OrderedTree<Label>, parent: Option<&Node<Label>>) -> Vec<(String, i64)> {
    let nodes = match parent {
        Some(parent) => tree
            .children(&reload(tree, parent))
            .expect("Failed to query children")
            .all()
            .expect("Failed to load children"),
        None => tree.roots().all().expect("Failed to load roots"),
    };
    nodes
        .into_iter()
        .map(|n| (n.data.name.clone(), n.position()))
        .collect()
}

/// Expected `(name, position)` list from names in order.
pub fn expected(names: &[&str]) -> Vec<(String, i64)> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_string(), i as i64))
        .collect()
}

// ==========================
// INVARIANT CHECKS
// ==========================

/// Every non-root node's path equals its parent's child prefix.
pub fn assert_prefix_invariant(tree: &Tree<Label>) {
    for node in tree.all().all().expect("Failed to load nodes") {
        let Some(parent) = tree.parent(&node).expect("Parent lookup failed") else {
            assert!(node.path().is_root());
            continue;
        };
        assert_eq!(
            &parent.child_prefix().expect("Parent should be persisted"),
            node.path(),
            "Path of {} does not match parent {}",
            node.data.name,
            parent.data.name
        );
    }
}

/// Every sibling group holds exactly the positions `0..n`.
pub fn assert_dense_positions(tree: &Tree<Label>) {
    let mut groups: HashMap<AncestryPath, Vec<i64>> = HashMap::new();
    for node in tree.all().all().expect("Failed to load nodes") {
        groups
            .entry(node.path().clone())
            .or_default()
            .push(node.position());
    }
    for (path, mut positions) in groups {
        positions.sort();
        let dense: Vec<i64> = (0..positions.len() as i64).collect();
        assert_eq!(positions, dense, "Positions under {path} are not dense");
    }
}
