//! Interaction tuning for drop zones and divider drags.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tessel_core::geometry::Size;

use crate::error::{DockError, DockResult};

/// Width in pixels of each edge drop zone.
pub const DROP_ZONE_MARGIN_PX: f64 = 20.0;

/// Deepest tree level (root = 0) that is offered drop zones.
pub const DROP_ZONE_MAX_DEPTH: usize = 2;

/// Pixels a divider drag keeps free on either side of the divider.
pub const DIVIDER_MIN_SPAN_PX: f64 = 100.0;

/// Viewport used by best-fit insertion before a real measurement exists.
pub const DEFAULT_VIEWPORT: Size = Size::new(1000.0, 1000.0);

/// Tunables for drag-time geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DockConfig {
    pub drop_zone_margin: f64,
    pub drop_zone_max_depth: usize,
    pub divider_min_span: f64,
}

impl DockConfig {
    pub fn new(
        drop_zone_margin: f64,
        drop_zone_max_depth: usize,
        divider_min_span: f64,
    ) -> DockResult<Self> {
        let config = Self {
            drop_zone_margin,
            drop_zone_max_depth,
            divider_min_span,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject margins and spans that are negative, zero or not finite.
    ///
    /// A positive divider span keeps both neighbours above grow 0 after a drag.
    pub fn validate(&self) -> DockResult<()> {
        if !(self.drop_zone_margin.is_finite() && self.drop_zone_margin > 0.0) {
            return Err(DockError::InvalidConfig {
                field: "drop_zone_margin",
                value: self.drop_zone_margin.to_string(),
            });
        }
        if !(self.divider_min_span.is_finite() && self.divider_min_span > 0.0) {
            return Err(DockError::InvalidConfig {
                field: "divider_min_span",
                value: self.divider_min_span.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            drop_zone_margin: DROP_ZONE_MARGIN_PX,
            drop_zone_max_depth: DROP_ZONE_MAX_DEPTH,
            divider_min_span: DIVIDER_MIN_SPAN_PX,
        }
    }
}
