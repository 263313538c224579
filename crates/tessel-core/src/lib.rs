#![forbid(unsafe_code)]

//! Core: geometry primitives for the Tessel docking layout engine.
//!
//! # Role in Tessel
//! `tessel-core` owns the pixel-space value types that cross the boundary
//! between the layout engine (`tessel-layout`) and whatever host renders it:
//!
//! - **Size**: the viewport observation a host feeds into best-fit insertion
//!   and drop-zone geometry.
//! - **Point**: pointer positions relative to the layout box.
//! - **Edges**: absolute left/top/right/bottom rectangles used for hit testing
//!   and drag highlights.
//!
//! Nothing here knows about trees; the engine converts its percentage insets
//! into these types at the edge.

pub mod geometry;

pub use geometry::{Edges, Point, Size};
