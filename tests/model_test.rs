use mindconv::{MindMap, Node, Relation};
use pretty_assertions::assert_eq;

#[test]
fn test_build_and_mutate_tree() {
    let mut root = Node::new("Root");
    let child = Node::new("Child");
    let child_copy = child.clone();
    root.add_child(child);
    assert_eq!(root.children.len(), 1);

    root.remove_child(&child_copy);
    assert!(root.children.is_empty());

    // Removing again is a no-op.
    root.remove_child(&child_copy);
    assert!(root.children.is_empty());
}

#[test]
fn test_depth_properties() {
    assert_eq!(Node::new("leaf").depth(), 1);

    let mut root = Node::new("root");
    root.add_child(Node::new("a"));
    assert_eq!(root.depth(), 2);

    let mut map = MindMap::new("m");
    assert_eq!(map.depth(), 0);
    map.set_root(root);
    assert_eq!(map.depth(), 2);
}

#[test]
fn test_lookup_order_prefers_root_tree() {
    let mut map = MindMap::new("m");
    map.set_root(Node::with_id("dup", "root copy"));
    map.add_detached(Node::with_id("dup", "detached copy"));

    assert_eq!(map.get_node_by_id("dup").unwrap().title, "root copy");
}

#[test]
fn test_relations_allow_dangling_endpoints() {
    let mut map = MindMap::new("m");
    map.set_root(Node::with_id("a", "A"));
    map.add_relation(Relation::new("a", "ghost", "haunts"));

    let relation = &map.relations[0];
    assert!(map.get_node_by_id(&relation.source_id).is_some());
    assert!(map.get_node_by_id(&relation.target_id).is_none());
}

#[test]
fn test_traverse_visits_whole_root_tree_in_order() {
    let mut left = Node::new("left");
    left.add_child(Node::new("left.1"));
    let right = Node::new("right");

    let mut root = Node::new("top");
    root.add_child(left);
    root.add_child(right);

    let mut map = MindMap::new("m");
    map.set_root(root);
    map.add_detached(Node::new("floating"));

    let mut seen = Vec::new();
    map.traverse(&mut |node, depth| seen.push((node.title.clone(), depth)));

    // Pre-order over the root tree only; detached subtrees are not visited.
    assert_eq!(
        seen,
        vec![
            ("top".to_string(), 0),
            ("left".to_string(), 1),
            ("left.1".to_string(), 2),
            ("right".to_string(), 1),
        ]
    );
    assert_eq!(map.node_count(), 4);
}

#[test]
fn test_generated_ids_are_distinct() {
    let a = Node::new("a");
    let b = Node::new("b");
    assert_ne!(a.id, b.id);
    assert!(!a.id.is_empty());
}
