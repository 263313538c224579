//! Id-indexed dock tree.
//!
//! A [`DockTree`] is a flat map from [`NodeId`] to [`Node`], a sorted id list
//! and an optional root. Containers reference their children by id and every
//! child points back at its container, so there is no ownership cycle and the
//! whole tree can be cloned, compared and validated as plain data.
//!
//! Public edits (see [`crate::ops`]) run on a cloned working tree that only
//! replaces the caller's value once [`DockTree::validate`] accepts it.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashSet;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{DockResult, InvariantViolation};

/// Default relative weight of a freshly created node.
pub const DEFAULT_GROW: f64 = 1.0;

/// Stable identifier for a node.
///
/// Fresh ids are random tokens (`id` followed by 16 hex digits). Ordering is
/// plain string ordering, which is how the id list is kept sorted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn random() -> Self {
        Self(format!("id{:016x}", rand::random::<u64>()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Axis along which a container divides its space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Children laid out left to right.
    Row,
    /// Children laid out top to bottom.
    Column,
}

impl Direction {
    /// Direction a wrapper container needs to place something on `side`.
    #[must_use]
    pub const fn for_side(side: Side) -> Self {
        match side {
            Side::Left | Side::Right => Self::Row,
            Side::Top | Side::Bottom => Self::Column,
        }
    }

    /// Orientation of the dividers between this container's children.
    #[must_use]
    pub const fn divider_orientation(self) -> Orientation {
        match self {
            Self::Row => Orientation::Vertical,
            Self::Column => Orientation::Horizontal,
        }
    }

    /// True when `side` lies on this direction's split axis.
    #[must_use]
    pub const fn accepts(self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::Row, Side::Left | Side::Right) | (Self::Column, Side::Top | Side::Bottom)
        )
    }
}

/// Side of a target node that a moving node is placed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Left and top place the moving node before the target.
    #[must_use]
    pub const fn is_leading(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// Orientation of a divider line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// A vertical line between row children; dragged horizontally.
    Vertical,
    /// A horizontal line between column children; dragged vertically.
    Horizontal,
}

/// Content or container payload of a node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind<T> {
    Content { payload: T },
    Container {
        direction: Direction,
        children: Vec<NodeId>,
    },
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node<T> {
    id: NodeId,
    grow: f64,
    parent: Option<NodeId>,
    min_size: Option<f64>,
    kind: NodeKind<T>,
}

impl<T> Node<T> {
    fn new(id: NodeId, kind: NodeKind<T>) -> Self {
        Self {
            id,
            grow: DEFAULT_GROW,
            parent: None,
            min_size: None,
            kind,
        }
    }

    #[inline]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Relative weight within the parent container.
    #[inline]
    pub fn grow(&self) -> f64 {
        self.grow
    }

    #[inline]
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// Advisory lower bound; carried through edits, never enforced.
    #[inline]
    pub fn min_size(&self) -> Option<f64> {
        self.min_size
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind<T> {
        &self.kind
    }

    #[inline]
    pub fn is_content(&self) -> bool {
        matches!(self.kind, NodeKind::Content { .. })
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { .. })
    }

    pub fn payload(&self) -> Option<&T> {
        match &self.kind {
            NodeKind::Content { payload } => Some(payload),
            NodeKind::Container { .. } => None,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match &self.kind {
            NodeKind::Container { direction, .. } => Some(*direction),
            NodeKind::Content { .. } => None,
        }
    }

    /// Ordered child ids; empty for content nodes.
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Container { children, .. } => children,
            NodeKind::Content { .. } => &[],
        }
    }

    pub(crate) fn set_grow(&mut self, grow: f64) {
        self.grow = grow;
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_min_size(&mut self, min_size: Option<f64>) {
        self.min_size = min_size;
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match &mut self.kind {
            NodeKind::Container { children, .. } => Some(children),
            NodeKind::Content { .. } => None,
        }
    }
}

/// The dock layout tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DockTree<T> {
    ids: Vec<NodeId>,
    nodes: BTreeMap<NodeId, Node<T>>,
    root: Option<NodeId>,
}

impl<T> Default for DockTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DockTree<T> {
    /// The canonical empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            nodes: BTreeMap::new(),
            root: None,
        }
    }

    /// A tree holding one content node as its root.
    #[must_use]
    pub fn singleton(payload: T) -> Self {
        let mut tree = Self::new();
        let id = tree.create_content(payload);
        tree.root = Some(id);
        tree.normalize_ids();
        tree
    }

    #[inline]
    pub fn root(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    /// All node ids, sorted ascending.
    #[inline]
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Payload of a content node.
    pub fn payload(&self, id: &NodeId) -> Option<&T> {
        self.nodes.get(id).and_then(Node::payload)
    }

    /// Content node ids in id order.
    pub fn content_ids(&self) -> Vec<NodeId> {
        self.ids
            .iter()
            .filter(|id| self.nodes.get(*id).is_some_and(Node::is_content))
            .cloned()
            .collect()
    }

    /// Visit every reachable node in pre-order, passing its depth (root = 0).
    pub fn visit(&self, mut visitor: impl FnMut(&Node<T>, usize)) {
        let Some(root) = &self.root else {
            return;
        };
        let mut stack = vec![(root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            visitor(node, depth);
            for child in node.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }

    /// Check every structural invariant of the tree.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if !self.ids.iter().eq(self.nodes.keys()) {
            return Err(InvariantViolation::IdsOutOfSync);
        }
        let Some(root) = &self.root else {
            if self.nodes.is_empty() {
                return Ok(());
            }
            return Err(InvariantViolation::EmptyTreeNotCanonical {
                nodes: self.nodes.len(),
            });
        };
        let root_node = self
            .nodes
            .get(root)
            .ok_or_else(|| InvariantViolation::DanglingRoot { root: root.clone() })?;
        if let Some(parent) = &root_node.parent {
            return Err(InvariantViolation::RootHasParent {
                root: root.clone(),
                parent: parent.clone(),
            });
        }

        let mut visited = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                return Err(InvariantViolation::Cycle {
                    node_id: id.clone(),
                });
            }
            let node = self
                .nodes
                .get(id)
                .ok_or_else(|| InvariantViolation::DanglingRoot { root: id.clone() })?;
            if !(node.grow.is_finite() && node.grow > 0.0) {
                return Err(InvariantViolation::NonPositiveGrow {
                    node_id: id.clone(),
                });
            }
            let NodeKind::Container {
                direction,
                children,
            } = &node.kind
            else {
                continue;
            };
            if children.len() < 2 {
                return Err(InvariantViolation::DegenerateContainer {
                    node_id: id.clone(),
                    children: children.len(),
                });
            }
            for child_id in children {
                let child =
                    self.nodes
                        .get(child_id)
                        .ok_or_else(|| InvariantViolation::MissingChild {
                            parent: id.clone(),
                            child: child_id.clone(),
                        })?;
                if child.parent.as_ref() != Some(id) {
                    return Err(InvariantViolation::ParentMismatch {
                        node_id: child_id.clone(),
                        expected: Some(id.clone()),
                        actual: child.parent.clone(),
                    });
                }
                if child.direction() == Some(*direction) {
                    return Err(InvariantViolation::SameDirectionChild {
                        parent: id.clone(),
                        child: child_id.clone(),
                    });
                }
                stack.push(child_id);
            }
        }

        if visited.len() != self.nodes.len() {
            if let Some(orphan) = self.nodes.keys().find(|id| !visited.contains(id)) {
                return Err(InvariantViolation::Unreachable {
                    node_id: orphan.clone(),
                });
            }
        }
        Ok(())
    }

    fn fresh_id(&self) -> NodeId {
        loop {
            let id = NodeId::random();
            if !self.nodes.contains_key(&id) {
                return id;
            }
        }
    }

    /// Register a detached content node; the id list is fixed up later by
    /// [`DockTree::normalize_ids`].
    pub(crate) fn create_content(&mut self, payload: T) -> NodeId {
        let id = self.fresh_id();
        self.nodes
            .insert(id.clone(), Node::new(id.clone(), NodeKind::Content { payload }));
        self.ids.push(id.clone());
        id
    }

    /// Register a container over `children` and point each child at it.
    pub(crate) fn create_container(
        &mut self,
        direction: Direction,
        children: Vec<NodeId>,
    ) -> NodeId {
        let id = self.fresh_id();
        for child in &children {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Some(id.clone());
            }
        }
        self.nodes.insert(
            id.clone(),
            Node::new(
                id.clone(),
                NodeKind::Container {
                    direction,
                    children,
                },
            ),
        );
        self.ids.push(id.clone());
        id
    }

    pub(crate) fn normalize_ids(&mut self) {
        self.ids.clear();
        self.ids.extend(self.nodes.keys().cloned());
    }

    pub(crate) fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node<T>> {
        self.nodes.get_mut(id)
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
    }

    pub(crate) fn remove_node(&mut self, id: &NodeId) -> Option<Node<T>> {
        self.nodes.remove(id)
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
        self.nodes.clear();
        self.root = None;
    }

    /// Put `replacement` where `old` sat: in `old`'s parent slot, or as root.
    ///
    /// `old` keeps its stale parent link; the caller reattaches or removes it.
    pub(crate) fn take_slot(&mut self, old: &NodeId, replacement: &NodeId) {
        let parent = self.nodes.get(old).and_then(|node| node.parent.clone());
        match &parent {
            Some(parent_id) => {
                if let Some(children) = self.nodes.get_mut(parent_id).and_then(Node::children_mut)
                {
                    for child in children.iter_mut().filter(|child| **child == *old) {
                        *child = replacement.clone();
                    }
                }
            }
            None => {
                if self.root.as_ref() == Some(old) {
                    self.root = Some(replacement.clone());
                }
            }
        }
        if let Some(node) = self.nodes.get_mut(replacement) {
            node.parent = parent;
        }
    }

    /// True when `ancestor` lies on `node`'s parent chain (or is `node`).
    pub(crate) fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut cursor = Some(node);
        let mut steps = 0usize;
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            cursor = self.nodes.get(id).and_then(|node| node.parent.as_ref());
        }
        false
    }

    /// Every id in the subtree rooted at `id`, including `id`.
    pub(crate) fn collect_subtree(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children().iter().cloned());
            }
            out.push(current);
        }
        out
    }

    /// Run `edit` on a working copy and commit it only if it validates.
    pub(crate) fn transact<R>(
        &mut self,
        op: &'static str,
        edit: impl FnOnce(&mut Self) -> DockResult<R>,
    ) -> DockResult<R>
    where
        T: Clone,
    {
        let mut working = self.clone();
        let outcome = match edit(&mut working) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(op, %err, "dock edit rejected");
                return Err(err);
            }
        };
        if let Err(violation) = working.validate() {
            error!(op, %violation, "dock edit broke tree invariants");
            return Err(violation.into());
        }
        debug!(
            op,
            root = ?working.root.as_ref().map(NodeId::as_str),
            node_count = working.len(),
            "dock edit applied"
        );
        *self = working;
        Ok(outcome)
    }
}
