#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All values are pixels in layout-box space (origin at the top-left corner
//! of the box that hosts the dock).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A pointer or anchor position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of the layout box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Area in square pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when either dimension is zero, negative, or not finite.
    ///
    /// A degenerate size cannot rank tiles against each other.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// An axis-aligned rectangle described by its four absolute edges.
///
/// Unlike an origin/size rectangle, `Edges` is what the drop-zone pass
/// narrows side by side, so the edges are stored directly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Edges {
    /// Left edge (inclusive).
    pub left: f64,
    /// Top edge (inclusive).
    pub top: f64,
    /// Right edge (exclusive).
    pub right: f64,
    /// Bottom edge (exclusive).
    pub bottom: f64,
}

impl Edges {
    /// Create a rectangle from its edges.
    #[inline]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle covering a whole box of the given size.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Horizontal extent; negative when the edges are inverted.
    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Vertical extent; negative when the edges are inverted.
    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Horizontal midline.
    #[inline]
    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    /// Vertical midline.
    #[inline]
    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// Check if the rectangle has zero (or inverted) area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }

    /// Clip this rectangle to `other`.
    ///
    /// The result may be empty (or inverted) when the two do not overlap;
    /// callers that care check [`Edges::is_empty`].
    #[inline]
    pub fn clip_to(&self, other: &Edges) -> Edges {
        Edges {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }
    }
}
