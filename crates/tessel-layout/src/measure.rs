//! Percentage measurement of a dock tree.
//!
//! Every node gets an [`Inset`]: its distance from each edge of the whole
//! layout, in percent. Containers split their span along their direction in
//! proportion to their children's grow; the cross axis is inherited as is.
//! The pass also emits one [`Divider`] between every pair of adjacent
//! siblings.
//!
//! There is no cache. Callers re-measure after every accepted edit and on
//! every drag move.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tessel_core::geometry::{Edges, Size};
use tracing::trace;

use crate::error::{DockError, DockResult};
use crate::tree::{Direction, DockTree, Node, NodeId, NodeKind, Orientation};

/// Distance of a node's edges from the layout's edges, in percent (0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Inset {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Inset {
    /// The whole layout.
    pub const FULL: Self = Self {
        left: 0.0,
        right: 0.0,
        top: 0.0,
        bottom: 0.0,
    };

    /// Horizontal share of the layout, in percent.
    #[inline]
    pub fn width(&self) -> f64 {
        100.0 - self.left - self.right
    }

    /// Vertical share of the layout, in percent.
    #[inline]
    pub fn height(&self) -> f64 {
        100.0 - self.top - self.bottom
    }

    /// Absolute pixel rectangle inside a viewport of `viewport` size.
    pub fn to_edges(&self, viewport: Size) -> Edges {
        Edges::new(
            self.left / 100.0 * viewport.width,
            self.top / 100.0 * viewport.height,
            (100.0 - self.right) / 100.0 * viewport.width,
            (100.0 - self.bottom) / 100.0 * viewport.height,
        )
    }

    /// Leading and trailing insets on `direction`'s split axis.
    fn along(&self, direction: Direction) -> (f64, f64) {
        match direction {
            Direction::Row => (self.left, self.right),
            Direction::Column => (self.top, self.bottom),
        }
    }

    /// Copy with the split-axis edges replaced by positions `start..stop`.
    fn slice(&self, direction: Direction, start: f64, stop: f64) -> Self {
        match direction {
            Direction::Row => Self {
                left: start,
                right: 100.0 - stop,
                ..*self
            },
            Direction::Column => Self {
                top: start,
                bottom: 100.0 - stop,
                ..*self
            },
        }
    }
}

/// Boundary between two adjacent siblings.
///
/// Positions are percent offsets from the layout's leading edge on the
/// container's split axis; `cross_*` are the container's insets on the
/// other axis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Divider {
    pub id: String,
    pub container: NodeId,
    pub before: NodeId,
    pub after: NodeId,
    pub orientation: Orientation,
    /// Where the line sits.
    pub offset: f64,
    pub cross_leading: f64,
    pub cross_trailing: f64,
    /// Leading edge of `before`.
    pub lower: f64,
    /// Trailing edge of `after`.
    pub upper: f64,
}

impl Divider {
    /// Inset of the (zero-thickness) divider line.
    pub fn inset(&self) -> Inset {
        match self.orientation {
            Orientation::Vertical => Inset {
                left: self.offset,
                right: 100.0 - self.offset,
                top: self.cross_leading,
                bottom: self.cross_trailing,
            },
            Orientation::Horizontal => Inset {
                left: self.cross_leading,
                right: self.cross_trailing,
                top: self.offset,
                bottom: 100.0 - self.offset,
            },
        }
    }

    /// Pixel length of the layout along the axis this divider moves on.
    pub fn axis_extent(&self, viewport: Size) -> f64 {
        match self.orientation {
            Orientation::Vertical => viewport.width,
            Orientation::Horizontal => viewport.height,
        }
    }
}

/// Output of [`DockTree::measure`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Measurement {
    insets: BTreeMap<NodeId, Inset>,
    dividers: Vec<Divider>,
}

impl Measurement {
    pub fn inset(&self, id: &NodeId) -> Option<Inset> {
        self.insets.get(id).copied()
    }

    pub fn insets(&self) -> &BTreeMap<NodeId, Inset> {
        &self.insets
    }

    /// Dividers in pre-order of their containers, left to right within one.
    pub fn dividers(&self) -> &[Divider] {
        &self.dividers
    }

    pub fn divider_between(&self, before: &NodeId, after: &NodeId) -> Option<&Divider> {
        self.dividers
            .iter()
            .find(|divider| &divider.before == before && &divider.after == after)
    }

    /// Pixel rectangle of a measured node.
    pub fn rect(&self, id: &NodeId, viewport: Size) -> Option<Edges> {
        self.insets.get(id).map(|inset| inset.to_edges(viewport))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.insets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.insets.is_empty()
    }
}

impl<T> DockTree<T> {
    /// Convert grow weights into insets and dividers.
    ///
    /// Fails with [`DockError::ZeroTotalGrow`] rather than producing NaN
    /// when a container's children weigh nothing.
    pub fn measure(&self) -> DockResult<Measurement> {
        let mut out = Measurement::default();
        if let Some(root) = self.root() {
            measure_node(self, root, Inset::FULL, &mut out)?;
        }
        trace!(
            nodes = out.insets.len(),
            dividers = out.dividers.len(),
            "dock tree measured"
        );
        Ok(out)
    }
}

fn measure_node<T>(
    tree: &DockTree<T>,
    id: &NodeId,
    inset: Inset,
    out: &mut Measurement,
) -> DockResult<()> {
    let node = tree.node(id).ok_or_else(|| DockError::MissingNode {
        node_id: id.clone(),
    })?;
    out.insets.insert(id.clone(), inset);

    let NodeKind::Container {
        direction,
        children,
    } = node.kind()
    else {
        return Ok(());
    };
    let direction = *direction;

    let grows = children
        .iter()
        .map(|child| {
            tree.node(child)
                .map(Node::grow)
                .ok_or_else(|| DockError::MissingNode {
                    node_id: child.clone(),
                })
        })
        .collect::<DockResult<Vec<f64>>>()?;
    let total: f64 = grows.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(DockError::ZeroTotalGrow {
            node_id: id.clone(),
        });
    }

    let (leading, trailing) = inset.along(direction);
    let cross = inset.along(match direction {
        Direction::Row => Direction::Column,
        Direction::Column => Direction::Row,
    });
    let span = 100.0 - leading - trailing;
    let end = 100.0 - trailing;

    let mut consumed = 0.0;
    let mut previous_start = leading;
    for (index, (child, grow)) in children.iter().zip(&grows).enumerate() {
        let start = leading + consumed / total * span;
        consumed += grow;
        // The last slice ends exactly on the container's edge.
        let stop = if index + 1 == children.len() {
            end
        } else {
            leading + consumed / total * span
        };

        if index > 0 {
            let before = &children[index - 1];
            out.dividers.push(Divider {
                id: format!("{before}|{child}"),
                container: id.clone(),
                before: before.clone(),
                after: child.clone(),
                orientation: direction.divider_orientation(),
                offset: start,
                cross_leading: cross.0,
                cross_trailing: cross.1,
                lower: previous_start,
                upper: stop,
            });
        }
        previous_start = start;

        measure_node(tree, child, inset.slice(direction, start, stop), out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn row_with_grows(grows: &[f64]) -> (DockTree<usize>, NodeId, Vec<NodeId>) {
        let mut tree = DockTree::new();
        let children: Vec<NodeId> = (0..grows.len()).map(|i| tree.create_content(i)).collect();
        for (child, grow) in children.iter().zip(grows) {
            tree.node_mut(child).expect("child").set_grow(*grow);
        }
        let row = tree.create_container(Direction::Row, children.clone());
        tree.set_root(Some(row.clone()));
        tree.normalize_ids();
        (tree, row, children)
    }

    #[test]
    fn empty_tree_measures_nothing() {
        let tree: DockTree<u8> = DockTree::new();
        let measurement = tree.measure().expect("measure");
        assert!(measurement.is_empty());
        assert!(measurement.dividers().is_empty());
    }

    #[test]
    fn lone_content_fills_layout() {
        let tree = DockTree::singleton(());
        let root = tree.root().expect("root");
        let measurement = tree.measure().expect("measure");
        assert_eq!(measurement.inset(root), Some(Inset::FULL));
    }

    #[test]
    fn row_splits_by_quarter_quarter_half() {
        let (tree, row, children) = row_with_grows(&[1.0, 1.0, 2.0]);
        let measurement = tree.measure().expect("measure");

        let a = measurement.inset(&children[0]).expect("a");
        let b = measurement.inset(&children[1]).expect("b");
        let c = measurement.inset(&children[2]).expect("c");
        assert_eq!((a.left, a.right), (0.0, 75.0));
        assert_eq!((b.left, b.right), (25.0, 50.0));
        assert_eq!((c.left, c.right), (50.0, 0.0));
        for inset in [a, b, c] {
            assert_eq!((inset.top, inset.bottom), (0.0, 0.0));
        }
        assert_eq!(measurement.inset(&row), Some(Inset::FULL));
    }

    #[test]
    fn dividers_bound_neighbouring_slices() {
        let (tree, row, children) = row_with_grows(&[1.0, 1.0, 2.0]);
        let measurement = tree.measure().expect("measure");
        assert_eq!(measurement.dividers().len(), 2);

        let first = measurement
            .divider_between(&children[0], &children[1])
            .expect("first divider");
        assert_eq!(first.container, row);
        assert_eq!(first.orientation, Orientation::Vertical);
        assert_eq!(first.offset, 25.0);
        assert_eq!((first.lower, first.upper), (0.0, 50.0));
        assert_eq!(first.id, format!("{}|{}", children[0], children[1]));

        let second = measurement
            .divider_between(&children[1], &children[2])
            .expect("second divider");
        assert_eq!(second.offset, 50.0);
        assert_eq!((second.lower, second.upper), (25.0, 100.0));
        assert_eq!(second.inset().left, 50.0);
        assert_eq!(second.inset().right, 50.0);
    }

    #[test]
    fn nested_column_inherits_cross_axis() {
        // row[a, column[b, c]]
        let mut tree = DockTree::new();
        let a = tree.create_content('a');
        let b = tree.create_content('b');
        let c = tree.create_content('c');
        let column = tree.create_container(Direction::Column, vec![b.clone(), c.clone()]);
        let row = tree.create_container(Direction::Row, vec![a, column.clone()]);
        tree.set_root(Some(row));
        tree.normalize_ids();

        let measurement = tree.measure().expect("measure");
        let column_inset = measurement.inset(&column).expect("column");
        assert_eq!((column_inset.left, column_inset.right), (50.0, 0.0));

        let b_inset = measurement.inset(&b).expect("b");
        assert_eq!(
            b_inset,
            Inset {
                left: 50.0,
                right: 0.0,
                top: 0.0,
                bottom: 50.0
            }
        );
        let divider = measurement.divider_between(&b, &c).expect("divider");
        assert_eq!(divider.orientation, Orientation::Horizontal);
        assert_eq!((divider.cross_leading, divider.cross_trailing), (50.0, 0.0));
        assert_eq!(divider.offset, 50.0);
    }

    #[test]
    fn zero_total_grow_is_rejected() {
        let (tree, row, _children) = row_with_grows(&[0.0, 0.0]);
        assert_eq!(
            tree.measure(),
            Err(DockError::ZeroTotalGrow { node_id: row })
        );
    }

    #[test]
    fn pixel_rect_scales_by_viewport() {
        let (tree, _row, children) = row_with_grows(&[1.0, 3.0]);
        let measurement = tree.measure().expect("measure");
        let rect = measurement
            .rect(&children[1], Size::new(800.0, 600.0))
            .expect("rect");
        assert_eq!(rect, Edges::new(200.0, 0.0, 800.0, 600.0));
    }

    proptest! {
        #[test]
        fn row_slices_partition_the_span(grows in proptest::collection::vec(0.01f64..50.0, 2..12)) {
            let (tree, _row, children) = row_with_grows(&grows);
            let measurement = tree.measure().expect("measure");
            let total: f64 = grows.iter().sum();

            let mut cursor = 0.0;
            let mut widths = 0.0;
            for (child, grow) in children.iter().zip(&grows) {
                let inset = measurement.inset(child).expect("inset");
                prop_assert!((inset.left - cursor).abs() < EPS);
                prop_assert!((inset.width() - grow / total * 100.0).abs() < 1e-6);
                cursor = 100.0 - inset.right;
                widths += inset.width();
            }
            prop_assert!((cursor - 100.0).abs() < EPS);
            prop_assert!((widths - 100.0).abs() < 1e-6);
            prop_assert_eq!(measurement.dividers().len(), children.len() - 1);
        }
    }
}
