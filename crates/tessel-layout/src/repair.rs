//! Structural repair after edits.
//!
//! Two shapes are folded away: containers with fewer than two children, and
//! containers nested directly inside a container of the same direction.
//! Each pass walks the tree top-down; passes repeat until one makes no
//! change, since a fold can expose a new same-direction pair one level up.

use tracing::trace;

use crate::tree::{DockTree, Node, NodeId, NodeKind};

/// Restore the degenerate-container and same-direction invariants, then
/// rebuild the id list.
pub(crate) fn repair<T>(tree: &mut DockTree<T>) {
    let mut passes = 0usize;
    while repair_pass(tree) {
        passes += 1;
    }
    if passes > 0 {
        trace!(passes, node_count = tree.len(), "dock tree repaired");
    }
    tree.normalize_ids();
}

fn repair_pass<T>(tree: &mut DockTree<T>) -> bool {
    let Some(root) = tree.root().cloned() else {
        return false;
    };
    let mut changed = false;
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(NodeKind::Container {
            direction,
            children,
        }) = tree.node(&id).map(Node::kind)
        else {
            continue;
        };
        let direction = *direction;
        let children = children.clone();

        match children.as_slice() {
            [] => {
                drop_empty(tree, &id);
                changed = true;
                continue;
            }
            [only] => {
                promote_only_child(tree, &id, only);
                stack.push(only.clone());
                changed = true;
                continue;
            }
            _ => {}
        }

        for child in &children {
            if tree.node(child).and_then(Node::direction) == Some(direction) {
                flatten_into_parent(tree, &id, child);
                changed = true;
            }
        }
        if let Some(node) = tree.node(&id) {
            stack.extend(node.children().iter().rev().cloned());
        }
    }
    changed
}

/// Replace a single-child container by its child.
fn promote_only_child<T>(tree: &mut DockTree<T>, container: &NodeId, child: &NodeId) {
    trace!(container = %container, child = %child, "collapse degenerate container");
    tree.take_slot(container, child);
    tree.remove_node(container);
}

fn drop_empty<T>(tree: &mut DockTree<T>, container: &NodeId) {
    trace!(container = %container, "drop empty container");
    let parent = tree.node(container).and_then(Node::parent).cloned();
    match parent {
        Some(parent) => {
            if let Some(children) = tree.node_mut(&parent).and_then(Node::children_mut) {
                children.retain(|child| child != container);
            }
            tree.remove_node(container);
        }
        None => tree.clear(),
    }
}

/// Splice `child`'s children into `parent` where `child` sat.
fn flatten_into_parent<T>(tree: &mut DockTree<T>, parent: &NodeId, child: &NodeId) {
    let Some(removed) = tree.remove_node(child) else {
        return;
    };
    trace!(
        parent = %parent,
        child = %child,
        spliced = removed.children().len(),
        "flatten same-direction container"
    );
    let grandchildren = removed.children().to_vec();
    for grandchild in &grandchildren {
        if let Some(node) = tree.node_mut(grandchild) {
            node.set_parent(Some(parent.clone()));
        }
    }
    if let Some(children) = tree.node_mut(parent).and_then(Node::children_mut) {
        if let Some(slot) = children.iter().position(|id| id == child) {
            children.splice(slot..=slot, grandchildren);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::repair;
    use crate::tree::{Direction, DockTree, Node, NodeId};

    fn payloads(tree: &DockTree<&'static str>, ids: &[NodeId]) -> Vec<&'static str> {
        ids.iter()
            .map(|id| *tree.payload(id).expect("content payload"))
            .collect()
    }

    #[test]
    fn nested_rows_merge_in_order() {
        let mut tree = DockTree::new();
        let a = tree.create_content("a");
        let b = tree.create_content("b");
        let c = tree.create_content("c");
        let d = tree.create_content("d");
        let inner = tree.create_container(Direction::Row, vec![b, c]);
        let outer = tree.create_container(Direction::Row, vec![a, inner.clone(), d]);
        tree.set_root(Some(outer.clone()));

        repair(&mut tree);

        assert!(tree.validate().is_ok());
        assert_eq!(tree.root(), Some(&outer));
        assert!(!tree.contains(&inner));
        let root = tree.node(&outer).expect("outer");
        assert_eq!(payloads(&tree, root.children()), vec!["a", "b", "c", "d"]);
        for child in root.children() {
            assert_eq!(tree.node(child).and_then(Node::parent), Some(&outer));
        }
    }

    #[test]
    fn degenerate_chain_collapses_to_leaf() {
        let mut tree = DockTree::new();
        let a = tree.create_content("a");
        let inner = tree.create_container(Direction::Column, vec![a.clone()]);
        let outer = tree.create_container(Direction::Row, vec![inner]);
        tree.set_root(Some(outer));

        repair(&mut tree);

        assert!(tree.validate().is_ok());
        assert_eq!(tree.root(), Some(&a));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.ids(), &[a]);
    }

    #[test]
    fn promoted_child_merges_with_same_direction_parent() {
        // row[a, column[row[b, c]]] -> row[a, b, c]
        let mut tree = DockTree::new();
        let a = tree.create_content("a");
        let b = tree.create_content("b");
        let c = tree.create_content("c");
        let inner_row = tree.create_container(Direction::Row, vec![b, c]);
        let column = tree.create_container(Direction::Column, vec![inner_row]);
        let outer = tree.create_container(Direction::Row, vec![a, column]);
        tree.set_root(Some(outer.clone()));

        repair(&mut tree);

        assert!(tree.validate().is_ok());
        let root = tree.node(&outer).expect("outer");
        assert_eq!(payloads(&tree, root.children()), vec!["a", "b", "c"]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn flatten_keeps_alternating_grandchildren() {
        // row[a, row[b, column[c, d]]] -> row[a, b, column[c, d]]
        let mut tree = DockTree::new();
        let a = tree.create_content("a");
        let b = tree.create_content("b");
        let c = tree.create_content("c");
        let d = tree.create_content("d");
        let column = tree.create_container(Direction::Column, vec![c, d]);
        let inner = tree.create_container(Direction::Row, vec![b, column.clone()]);
        let outer = tree.create_container(Direction::Row, vec![a, inner]);
        tree.set_root(Some(outer.clone()));

        repair(&mut tree);

        assert!(tree.validate().is_ok());
        let root = tree.node(&outer).expect("outer");
        assert_eq!(root.children().len(), 3);
        assert_eq!(root.children()[2], column);
        assert_eq!(tree.node(&column).and_then(Node::parent), Some(&outer));
    }

    #[test]
    fn empty_root_container_clears_tree() {
        let mut tree: DockTree<&'static str> = DockTree::new();
        let row = tree.create_container(Direction::Row, Vec::new());
        tree.set_root(Some(row));

        repair(&mut tree);

        assert!(tree.is_empty());
        assert!(tree.ids().is_empty());
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn valid_tree_is_left_alone() {
        let mut tree = DockTree::new();
        let a = tree.create_content("a");
        let b = tree.create_content("b");
        let row = tree.create_container(Direction::Row, vec![a, b]);
        tree.set_root(Some(row));
        tree.normalize_ids();
        let before = tree.clone();

        repair(&mut tree);

        assert_eq!(tree, before);
    }
}
