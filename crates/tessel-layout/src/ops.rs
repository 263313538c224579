//! Structural edits.
//!
//! Every public edit runs through a transaction: it works on a copy,
//! repairs and validates it, and only then replaces the caller's tree. A
//! rejected edit leaves the tree exactly as it was.

use tessel_core::geometry::{Point, Size};
use tracing::trace;

use crate::config::{DEFAULT_VIEWPORT, DockConfig};
use crate::error::{DockError, DockResult};
use crate::measure::Divider;
use crate::repair::repair;
use crate::tree::{DEFAULT_GROW, Direction, DockTree, Node, NodeId, Orientation, Side};

impl<T: Clone> DockTree<T> {
    /// Insert `payload` beside the largest content tile.
    ///
    /// The largest tile is split along its longer screen axis: a tile wider
    /// than tall gets a row split. Ties go to the first tile in pre-order.
    /// A degenerate `viewport` is replaced by [`DEFAULT_VIEWPORT`].
    pub fn add_best_fitting(&mut self, payload: T, viewport: Size) -> DockResult<NodeId> {
        let viewport = if viewport.is_degenerate() {
            DEFAULT_VIEWPORT
        } else {
            viewport
        };
        self.transact("add_best_fitting", |tree| {
            tree.insert_best_fitting(payload, viewport)
        })
    }

    /// Move `moving` next to `target` on `side`.
    ///
    /// `moving` is first detached the same way [`DockTree::delete_tile`]
    /// unlinks a node, so its old position is simplified. Fails when either id
    /// is unknown, when they are equal, when `target` lies inside `moving`, or
    /// when detaching `moving` folds `target` away.
    pub fn apply_insert(&mut self, moving: &NodeId, target: &NodeId, side: Side) -> DockResult<()> {
        self.transact("apply_insert", |tree| {
            tree.insert_beside(moving, target, side)
        })
    }

    /// Remove a node and its subtree, collapsing the slot it leaves.
    ///
    /// Deleting the root clears the tree. Unknown ids are ignored.
    pub fn delete_tile(&mut self, id: &NodeId) -> DockResult<()> {
        if !self.contains(id) {
            trace!(node = %id, "delete of unknown node ignored");
            return Ok(());
        }
        self.transact("delete_tile", |tree| {
            tree.remove_tile(id);
            Ok(())
        })
    }

    /// Assign new grow weights.
    ///
    /// All ids and weights are checked before any is assigned: an unknown id
    /// or a weight that is not finite and positive rejects the whole update.
    pub fn update_growth_values<I>(&mut self, weights: I) -> DockResult<()>
    where
        I: IntoIterator<Item = (NodeId, f64)>,
    {
        let weights: Vec<(NodeId, f64)> = weights.into_iter().collect();
        self.transact("update_growth_values", |tree| {
            for (id, grow) in &weights {
                if !tree.contains(id) {
                    return Err(DockError::MissingNode { node_id: id.clone() });
                }
                if !(grow.is_finite() && *grow > 0.0) {
                    return Err(DockError::InvalidGrow {
                        node_id: id.clone(),
                        grow: *grow,
                    });
                }
            }
            for (id, grow) in weights {
                if let Some(node) = tree.node_mut(&id) {
                    node.set_grow(grow);
                }
            }
            Ok(())
        })
    }

    pub fn set_min_size(&mut self, id: &NodeId, min_size: Option<f64>) -> DockResult<()> {
        self.transact("set_min_size", |tree| {
            if let Some(value) = min_size.filter(|value| !(value.is_finite() && *value >= 0.0)) {
                return Err(DockError::InvalidMinSize {
                    node_id: id.clone(),
                    min_size: value,
                });
            }
            let node = tree.node_mut(id).ok_or_else(|| DockError::MissingNode {
                node_id: id.clone(),
            })?;
            node.set_min_size(min_size);
            Ok(())
        })
    }

    /// Redistribute the weight of a divider's two neighbours to follow a
    /// pointer at `pointer` (pixels, relative to the layout box).
    ///
    /// The pointer is kept `config.divider_min_span` pixels away from the
    /// outer edges of both neighbours; when they are too small for that, the
    /// divider is centred. Their combined grow is conserved.
    pub fn resize_divider(
        &mut self,
        divider: &Divider,
        pointer: Point,
        viewport: Size,
        config: &DockConfig,
    ) -> DockResult<()> {
        config.validate()?;
        let extent = divider.axis_extent(viewport);
        let lower = divider.lower / 100.0 * extent;
        let upper = divider.upper / 100.0 * extent;
        let span = upper - lower;
        if !(span.is_finite() && span > 0.0) {
            return Err(DockError::EmptyDividerSpan {
                before: divider.before.clone(),
                after: divider.after.clone(),
            });
        }

        let position = match divider.orientation {
            Orientation::Vertical => pointer.x,
            Orientation::Horizontal => pointer.y,
        };
        let min_span = config.divider_min_span;
        let midpoint = (lower + upper) / 2.0;
        let position = if !position.is_finite() || span < 2.0 * min_span {
            midpoint
        } else {
            position.clamp(lower + min_span, upper - min_span)
        };

        let grow_of = |id: &NodeId| {
            self.node(id).map(Node::grow).ok_or_else(|| DockError::MissingNode {
                node_id: id.clone(),
            })
        };
        let combined = grow_of(&divider.before)? + grow_of(&divider.after)?;
        let before = combined * (position - lower) / span;
        let after = combined - before;
        trace!(
            divider = %divider.id,
            position,
            before,
            after,
            "divider resized"
        );
        self.update_growth_values([
            (divider.before.clone(), before),
            (divider.after.clone(), after),
        ])
    }

    fn insert_best_fitting(&mut self, payload: T, viewport: Size) -> DockResult<NodeId> {
        let Some(root) = self.root().cloned() else {
            let id = self.create_content(payload);
            self.set_root(Some(id.clone()));
            self.normalize_ids();
            return Ok(id);
        };

        let measurement = self.measure()?;
        let mut best: Option<(NodeId, f64, Direction)> = None;
        self.visit(|node, _depth| {
            if !node.is_content() {
                return;
            }
            let Some(inset) = measurement.inset(node.id()) else {
                return;
            };
            let tile = Size::new(
                inset.width() / 100.0 * viewport.width,
                inset.height() / 100.0 * viewport.height,
            );
            let area = tile.area();
            let better = match &best {
                Some((_, best_area, _)) => area > *best_area,
                None => true,
            };
            if better {
                let direction = if tile.width > tile.height {
                    Direction::Row
                } else {
                    Direction::Column
                };
                best = Some((node.id().clone(), area, direction));
            }
        });
        let (winner, _, direction) =
            best.ok_or(DockError::MissingInsets { node_id: root })?;

        let id = self.create_content(payload);
        let parent = self.node(&winner).and_then(Node::parent).cloned();
        let parent_direction = parent
            .as_ref()
            .and_then(|parent| self.node(parent))
            .and_then(Node::direction);
        match parent {
            Some(parent) if parent_direction == Some(direction) => {
                self.append_child(&parent, &id)?;
            }
            _ => {
                self.wrap_in_place(&winner, direction, vec![winner.clone(), id.clone()])?;
            }
        }
        self.normalize_ids();
        Ok(id)
    }

    fn insert_beside(&mut self, moving: &NodeId, target: &NodeId, side: Side) -> DockResult<()> {
        if moving == target {
            return Err(DockError::SameNode {
                node_id: moving.clone(),
            });
        }
        for id in [moving, target] {
            if !self.contains(id) {
                return Err(DockError::MissingNode { node_id: id.clone() });
            }
        }
        if self.is_ancestor(moving, target) {
            return Err(DockError::AncestorConflict {
                ancestor: moving.clone(),
                descendant: target.clone(),
            });
        }

        self.detach(moving);
        repair(self);
        if !self.contains(target) {
            return Err(DockError::TargetRemovedByDetach {
                target: target.clone(),
            });
        }

        let target_direction = self.node(target).and_then(Node::direction);
        match target_direction {
            Some(direction) if direction.accepts(side) => {
                if side.is_leading() {
                    self.prepend_child(target, moving)?;
                } else {
                    self.append_child(target, moving)?;
                }
            }
            _ => {
                let children = if side.is_leading() {
                    vec![moving.clone(), target.clone()]
                } else {
                    vec![target.clone(), moving.clone()]
                };
                self.wrap_in_place(target, Direction::for_side(side), children)?;
            }
        }
        // A wrapper placed inside a container of its own direction merges here.
        repair(self);
        Ok(())
    }

    pub(crate) fn remove_tile(&mut self, id: &NodeId) {
        if self.node(id).and_then(Node::parent).is_none() {
            self.clear();
            return;
        }
        self.detach(id);
        for node in self.collect_subtree(id) {
            self.remove_node(&node);
        }
        self.normalize_ids();
        repair(self);
    }

    /// Unlink `id` from its container. A two-child container is replaced by
    /// the surviving sibling, which is reset to the default grow. The
    /// detached subtree stays registered.
    fn detach(&mut self, id: &NodeId) {
        let Some(parent) = self.node(id).and_then(Node::parent).cloned() else {
            self.set_root(None);
            return;
        };
        let siblings = self
            .node(&parent)
            .map(|node| node.children().to_vec())
            .unwrap_or_default();
        if siblings.len() == 2 {
            if let Some(survivor) = siblings.iter().find(|sibling| *sibling != id) {
                trace!(container = %parent, survivor = %survivor, "sibling absorbs container");
                self.take_slot(&parent, survivor);
                if let Some(node) = self.node_mut(survivor) {
                    node.set_grow(DEFAULT_GROW);
                }
                self.remove_node(&parent);
            }
        } else if let Some(children) = self.node_mut(&parent).and_then(Node::children_mut) {
            children.retain(|child| child != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.set_parent(None);
        }
    }

    /// Put a new `direction` container holding `children` where `target`
    /// sat. The container takes over the target's grow.
    fn wrap_in_place(
        &mut self,
        target: &NodeId,
        direction: Direction,
        children: Vec<NodeId>,
    ) -> DockResult<NodeId> {
        let grow = self
            .node(target)
            .map(Node::grow)
            .ok_or_else(|| DockError::MissingNode {
                node_id: target.clone(),
            })?;
        let wrapper = self.create_container(direction, Vec::new());
        self.take_slot(target, &wrapper);
        for child in &children {
            if let Some(node) = self.node_mut(child) {
                node.set_parent(Some(wrapper.clone()));
            }
        }
        if let Some(node) = self.node_mut(&wrapper) {
            node.set_grow(grow);
            if let Some(slot) = node.children_mut() {
                *slot = children;
            }
        }
        Ok(wrapper)
    }

    fn append_child(&mut self, container: &NodeId, child: &NodeId) -> DockResult<()> {
        self.container_children(container)?.push(child.clone());
        if let Some(node) = self.node_mut(child) {
            node.set_parent(Some(container.clone()));
        }
        Ok(())
    }

    fn prepend_child(&mut self, container: &NodeId, child: &NodeId) -> DockResult<()> {
        self.container_children(container)?.insert(0, child.clone());
        if let Some(node) = self.node_mut(child) {
            node.set_parent(Some(container.clone()));
        }
        Ok(())
    }

    fn container_children(&mut self, container: &NodeId) -> DockResult<&mut Vec<NodeId>> {
        let node = self
            .node_mut(container)
            .ok_or_else(|| DockError::MissingNode {
                node_id: container.clone(),
            })?;
        node.children_mut().ok_or_else(|| DockError::NotAContainer {
            node_id: container.clone(),
        })
    }
}
