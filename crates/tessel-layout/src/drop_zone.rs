//! Drop targets for a tile being dragged.
//!
//! Each visited node offers thin edge strips. A drop on a strip inserts the
//! dragged tile on that side of the node. Zones are computed top-down with a
//! shrinking bounding rectangle: every level carves its strips off the
//! rectangle before its children are visited, so nested strips never overlap
//! their ancestors'. Sides that lie on the parent's split axis are skipped,
//! since the parent already offers an equivalent drop there.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tessel_core::geometry::{Edges, Point, Size};
use tracing::trace;

use crate::config::DockConfig;
use crate::error::{DockError, DockResult};
use crate::measure::Measurement;
use crate::tree::{Direction, DockTree, NodeId, NodeKind, Side};

/// What releasing the drag over a zone does.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DropAction {
    /// `DockTree::apply_insert(dragged, target, side)`.
    Insert { target: NodeId, side: Side },
}

/// A hit-test strip plus the larger preview rectangle that is highlighted
/// while the pointer is over it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DropZone {
    pub hit: Edges,
    pub visible: Edges,
    pub action: DropAction,
    /// Tree level of the target (root = 0).
    pub depth: usize,
}

impl DropZone {
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        self.hit.contains(point)
    }

    pub fn target(&self) -> &NodeId {
        match &self.action {
            DropAction::Insert { target, .. } => target,
        }
    }

    pub fn side(&self) -> Side {
        match self.action {
            DropAction::Insert { side, .. } => side,
        }
    }
}

/// First zone, in emission order, whose strip contains `point`.
pub fn hit_test(zones: &[DropZone], point: Point) -> Option<&DropZone> {
    zones.iter().find(|zone| zone.contains(point))
}

/// Layout shown while a tile is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPreview {
    /// Measurement of the tree without the dragged tile.
    pub measurement: Measurement,
    pub zones: Vec<DropZone>,
}

impl<T> DockTree<T> {
    /// Drop zones of this tree.
    ///
    /// The dragged tile must already be removed and `measurement` must come
    /// from this tree; see [`DockTree::drop_zones_excluding`].
    pub fn drop_zones(
        &self,
        viewport: Size,
        measurement: &Measurement,
        config: &DockConfig,
    ) -> DockResult<Vec<DropZone>> {
        config.validate()?;
        let mut zones = Vec::new();
        if let Some(root) = self.root() {
            let pass = ZonePass {
                tree: self,
                viewport,
                measurement,
                config,
            };
            pass.visit(root, None, 0, None, &mut zones)?;
        }
        trace!(zones = zones.len(), "drop zones computed");
        Ok(zones)
    }
}

impl<T: Clone> DockTree<T> {
    /// Drop zones for dragging `excluded`: measured on a copy without it.
    pub fn drop_zones_excluding(
        &self,
        excluded: &NodeId,
        viewport: Size,
        config: &DockConfig,
    ) -> DockResult<Vec<DropZone>> {
        Ok(self.drag_preview(excluded, viewport, config)?.zones)
    }

    /// Measurement and drop zones of a copy of this tree without `dragged`.
    pub fn drag_preview(
        &self,
        dragged: &NodeId,
        viewport: Size,
        config: &DockConfig,
    ) -> DockResult<DragPreview> {
        if !self.contains(dragged) {
            return Err(DockError::MissingNode {
                node_id: dragged.clone(),
            });
        }
        let mut remaining = self.clone();
        remaining.remove_tile(dragged);
        let measurement = remaining.measure()?;
        let zones = remaining.drop_zones(viewport, &measurement, config)?;
        Ok(DragPreview { measurement, zones })
    }
}

struct ZonePass<'a, T> {
    tree: &'a DockTree<T>,
    viewport: Size,
    measurement: &'a Measurement,
    config: &'a DockConfig,
}

impl<T> ZonePass<'_, T> {
    fn visit(
        &self,
        id: &NodeId,
        parent_direction: Option<Direction>,
        depth: usize,
        bounds: Option<Edges>,
        zones: &mut Vec<DropZone>,
    ) -> DockResult<()> {
        if depth > self.config.drop_zone_max_depth {
            return Ok(());
        }
        let node = self.tree.node(id).ok_or_else(|| DockError::MissingNode {
            node_id: id.clone(),
        })?;
        let inset = self
            .measurement
            .inset(id)
            .ok_or_else(|| DockError::MissingInsets {
                node_id: id.clone(),
            })?;

        let rect = inset.to_edges(self.viewport);
        let mut bounds = bounds.map_or(rect, |bounds| bounds.clip_to(&rect));
        let margin = self.config.drop_zone_margin;
        let zone = |side: Side, hit: Edges, visible: Edges| DropZone {
            hit,
            visible,
            action: DropAction::Insert {
                target: id.clone(),
                side,
            },
            depth,
        };

        let b = bounds;
        let left = zone(
            Side::Left,
            Edges::new(b.left, b.top + margin, b.left + margin, b.bottom - margin),
            Edges::new(b.left, b.top, b.center_x(), b.bottom),
        );
        let right = zone(
            Side::Right,
            Edges::new(b.right - margin, b.top + margin, b.right, b.bottom - margin),
            Edges::new(b.center_x(), b.top, b.right, b.bottom),
        );
        let top = zone(
            Side::Top,
            Edges::new(b.left + margin, b.top, b.right - margin, b.top + margin),
            Edges::new(rect.left, rect.top, rect.right, b.center_y()),
        );
        let bottom = zone(
            Side::Bottom,
            Edges::new(b.left + margin, b.bottom - margin, b.right - margin, b.bottom),
            Edges::new(rect.left, b.center_y(), rect.right, rect.bottom),
        );

        if parent_direction != Some(Direction::Row) {
            bounds.left = left.hit.right;
            bounds.right = right.hit.left;
            zones.push(left);
            zones.push(right);
        }
        if parent_direction != Some(Direction::Column) {
            bounds.top = top.hit.bottom;
            bounds.bottom = bottom.hit.top;
            zones.push(top);
            zones.push(bottom);
        }

        if let NodeKind::Container {
            direction,
            children,
        } = node.kind()
        {
            for child in children {
                self.visit(child, Some(*direction), depth + 1, Some(bounds), zones)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1000.0, 500.0);

    fn row_of_two() -> (DockTree<&'static str>, NodeId, NodeId, NodeId) {
        let mut tree = DockTree::new();
        let a = tree.add_best_fitting("a", VIEWPORT).expect("a");
        let b = tree.add_best_fitting("b", VIEWPORT).expect("b");
        let row = tree.root().cloned().expect("root");
        (tree, row, a, b)
    }

    fn zones_of(tree: &DockTree<&'static str>) -> Vec<DropZone> {
        let measurement = tree.measure().expect("measure");
        tree.drop_zones(VIEWPORT, &measurement, &DockConfig::default())
            .expect("zones")
    }

    fn sides_for(zones: &[DropZone], target: &NodeId) -> Vec<Side> {
        zones
            .iter()
            .filter(|zone| zone.target() == target)
            .map(DropZone::side)
            .collect()
    }

    #[test]
    fn lone_tile_offers_four_edges() {
        let tree = DockTree::singleton("a");
        let root = tree.root().cloned().expect("root");
        let zones = zones_of(&tree);

        assert_eq!(
            sides_for(&zones, &root),
            vec![Side::Left, Side::Right, Side::Top, Side::Bottom]
        );
        assert_eq!(zones[0].hit, Edges::new(0.0, 20.0, 20.0, 480.0));
        assert_eq!(zones[0].visible, Edges::new(0.0, 0.0, 500.0, 500.0));
        assert_eq!(zones[1].hit, Edges::new(980.0, 20.0, 1000.0, 480.0));
        assert_eq!(zones[2].hit, Edges::new(20.0, 0.0, 980.0, 20.0));
        assert_eq!(zones[2].visible, Edges::new(0.0, 0.0, 1000.0, 250.0));
        assert_eq!(zones[3].hit, Edges::new(20.0, 480.0, 980.0, 500.0));
        assert_eq!(zones[3].visible, Edges::new(0.0, 250.0, 1000.0, 500.0));
        assert!(zones.iter().all(|zone| zone.depth == 0));
    }

    #[test]
    fn row_children_skip_sides_on_the_row_axis() {
        let (tree, row, a, b) = row_of_two();
        let zones = zones_of(&tree);

        assert_eq!(sides_for(&zones, &row).len(), 4);
        assert_eq!(sides_for(&zones, &a), vec![Side::Top, Side::Bottom]);
        assert_eq!(sides_for(&zones, &b), vec![Side::Top, Side::Bottom]);
    }

    #[test]
    fn child_strips_are_carved_inside_parent_strips() {
        let (tree, _row, a, b) = row_of_two();
        let zones = zones_of(&tree);

        let a_top = zones
            .iter()
            .find(|zone| zone.target() == &a && zone.side() == Side::Top)
            .expect("a top");
        // Bounds after the root carve: 20..980 x 20..480, clipped to a's half.
        assert_eq!(a_top.hit, Edges::new(40.0, 20.0, 480.0, 40.0));
        assert_eq!(a_top.depth, 1);

        let b_bottom = zones
            .iter()
            .find(|zone| zone.target() == &b && zone.side() == Side::Bottom)
            .expect("b bottom");
        assert_eq!(b_bottom.hit, Edges::new(520.0, 460.0, 960.0, 480.0));
        assert_eq!(b_bottom.visible, Edges::new(500.0, 250.0, 1000.0, 500.0));
    }

    #[test]
    fn depth_limit_stops_recursion() {
        let (mut tree, row, a, _b) = row_of_two();
        let c = tree.add_best_fitting("c", VIEWPORT).expect("c");
        let column = tree.node(&a).and_then(|node| node.parent()).cloned().expect("column");
        let measurement = tree.measure().expect("measure");

        let shallow = DockConfig {
            drop_zone_max_depth: 1,
            ..DockConfig::default()
        };
        let zones = tree
            .drop_zones(VIEWPORT, &measurement, &shallow)
            .expect("zones");
        assert!(sides_for(&zones, &a).is_empty());
        assert!(sides_for(&zones, &c).is_empty());
        assert_eq!(sides_for(&zones, &column), vec![Side::Top, Side::Bottom]);
        assert_eq!(sides_for(&zones, &row).len(), 4);

        let zones = zones_of(&tree);
        assert_eq!(sides_for(&zones, &a), vec![Side::Left, Side::Right]);
    }

    #[test]
    fn hit_test_returns_first_match() {
        let (tree, row, a, _b) = row_of_two();
        let zones = zones_of(&tree);

        let on_root_left = hit_test(&zones, Point::new(5.0, 250.0)).expect("root left");
        assert_eq!(
            on_root_left.action,
            DropAction::Insert {
                target: row.clone(),
                side: Side::Left
            }
        );
        let on_a_top = hit_test(&zones, Point::new(200.0, 30.0)).expect("a top");
        assert_eq!(on_a_top.target(), &a);
        assert_eq!(on_a_top.side(), Side::Top);
        assert!(hit_test(&zones, Point::new(250.0, 250.0)).is_none());
    }

    #[test]
    fn missing_insets_are_reported() {
        let (tree, ..) = row_of_two();
        let empty = Measurement::default();
        assert!(matches!(
            tree.drop_zones(VIEWPORT, &empty, &DockConfig::default()),
            Err(DockError::MissingInsets { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let tree = DockTree::singleton("a");
        let measurement = tree.measure().expect("measure");
        let config = DockConfig {
            drop_zone_margin: -4.0,
            ..DockConfig::default()
        };
        assert!(matches!(
            tree.drop_zones(VIEWPORT, &measurement, &config),
            Err(DockError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn preview_excludes_dragged_tile() {
        let (tree, _row, a, b) = row_of_two();
        let preview = tree
            .drag_preview(&a, VIEWPORT, &DockConfig::default())
            .expect("preview");

        assert_eq!(preview.measurement.len(), 1);
        assert_eq!(preview.measurement.inset(&b).map(|inset| inset.width()), Some(100.0));
        assert_eq!(sides_for(&preview.zones, &b).len(), 4);
        assert!(sides_for(&preview.zones, &a).is_empty());
        assert_eq!(
            tree.drop_zones_excluding(&a, VIEWPORT, &DockConfig::default())
                .expect("zones"),
            preview.zones
        );
        // The caller's tree is untouched.
        assert!(tree.contains(&a));
    }

    #[test]
    fn dropping_on_a_zone_applies_its_action() {
        let (mut tree, _row, a, b) = row_of_two();
        let zones = tree
            .drop_zones_excluding(&a, VIEWPORT, &DockConfig::default())
            .expect("zones");
        let zone = hit_test(&zones, Point::new(500.0, 490.0)).expect("bottom of b");
        let DropAction::Insert { target, side } = zone.action.clone();
        assert_eq!((&target, side), (&b, Side::Bottom));

        tree.apply_insert(&a, &target, side).expect("drop");
        let root = tree.root().cloned().expect("root");
        let root_node = tree.node(&root).expect("root node");
        assert_eq!(root_node.direction(), Some(Direction::Column));
        assert_eq!(root_node.children(), &[b, a]);
    }

    #[test]
    fn unknown_dragged_tile_is_rejected() {
        let (tree, ..) = row_of_two();
        assert!(matches!(
            tree.drag_preview(&NodeId::new("ghost"), VIEWPORT, &DockConfig::default()),
            Err(DockError::MissingNode { .. })
        ));
    }
}
