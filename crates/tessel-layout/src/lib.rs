#![forbid(unsafe_code)]

//! Docking layout engine: a tree of split containers and content tiles.
//!
//! # Role in Tessel
//! `tessel-layout` owns the tree model and every transform over it. Callers
//! hold a [`DockTree`] value, apply edits to it, and re-derive geometry with
//! [`DockTree::measure`] after every accepted edit. Rendering, pointer
//! capture and resize observation live outside this crate.
//!
//! # Primary responsibilities
//! - **Tree model** ([`tree`]): id-indexed nodes, creation and validation.
//! - **Repair** (`repair`): folds degenerate and same-direction containers.
//! - **Edits** ([`ops`]): best-fit insert, directional insert, delete,
//!   weight updates and divider drags.
//! - **Measurement** ([`measure`]): percentage insets and dividers.
//! - **Drop zones** ([`drop_zone`]): drag-time hit targets.
//!
//! # Example
//! ```
//! use tessel_layout::{DockTree, Side, Size};
//!
//! let mut tree = DockTree::new();
//! let editor = tree.add_best_fitting("editor", Size::new(1200.0, 800.0))?;
//! let terminal = tree.add_best_fitting("terminal", Size::new(1200.0, 800.0))?;
//! tree.apply_insert(&terminal, &editor, Side::Bottom)?;
//!
//! let measurement = tree.measure()?;
//! assert_eq!(measurement.inset(&editor).map(|inset| inset.height()), Some(50.0));
//! # Ok::<(), tessel_layout::DockError>(())
//! ```

pub mod config;
pub mod drop_zone;
pub mod error;
pub mod measure;
pub mod ops;
mod repair;
pub mod tree;

pub use config::{
    DEFAULT_VIEWPORT, DIVIDER_MIN_SPAN_PX, DROP_ZONE_MARGIN_PX, DROP_ZONE_MAX_DEPTH, DockConfig,
};
pub use drop_zone::{DragPreview, DropAction, DropZone, hit_test};
pub use error::{DockError, DockResult, InvariantViolation};
pub use measure::{Divider, Inset, Measurement};
pub use tessel_core::geometry::{Edges, Point, Size};
pub use tree::{DEFAULT_GROW, Direction, DockTree, Node, NodeId, NodeKind, Orientation, Side};
