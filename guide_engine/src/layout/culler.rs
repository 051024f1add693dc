//! Visibility culling.
//!
//! Every scroll tick evaluates all cells against the viewport, but only cells
//! whose visibility actually flips are mutated and reported back. The viewport
//! is widened by a margin on each side so cells just off screen are already
//! painted when they scroll in.

use serde::{Deserialize, Serialize};

use super::registry::{Cell, CellHandle};
use crate::config::GuideMode;

/// Scroll/size metrics reported by the host. The engine never measures
/// anything itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal scroll offset in pixels.
    pub offset_width: f64,
    /// Vertical scroll offset in pixels.
    pub offset_height: f64,
    /// Width of one channel column in pixels.
    pub base_column_width: f64,
    /// Height of one minute in pixels.
    pub base_row_height_per_minute: f64,
    /// Visible width in pixels.
    pub max_width: f64,
    /// Visible height in pixels.
    pub max_height: f64,
}

impl Viewport {
    /// Whether the metrics can be used for culling at all.
    pub fn is_usable(&self) -> bool {
        self.base_column_width.is_finite()
            && self.base_column_width > 0.0
            && self.base_row_height_per_minute.is_finite()
            && self.base_row_height_per_minute > 0.0
            && self.offset_width.is_finite()
            && self.offset_height.is_finite()
            && self.max_width.is_finite()
            && self.max_height.is_finite()
    }

    /// Margin-expanded visible region.
    pub fn bounds(&self, margin_ratio: f64) -> CullBounds {
        CullBounds {
            start_width: self.offset_width - self.max_width * margin_ratio,
            end_width: self.max_width * (1.0 + margin_ratio) + self.offset_width,
            top_start: (self.offset_height - self.max_height * margin_ratio)
                / self.base_row_height_per_minute,
            top_end: (self.offset_height + self.max_height * (1.0 + margin_ratio))
                / self.base_row_height_per_minute,
            column_width: self.base_column_width,
        }
    }
}

/// Visible region: pixels horizontally, minutes vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullBounds {
    pub start_width: f64,
    pub end_width: f64,
    pub top_start: f64,
    pub top_end: f64,
    pub column_width: f64,
}

impl CullBounds {
    pub fn contains(&self, cell: &Cell) -> bool {
        let left = cell.left() as f64;
        let horizontal = !((left + 1.0) * self.column_width <= self.start_width
            || left * self.column_width >= self.end_width);
        if !horizontal {
            return false;
        }
        let top = cell.top() as f64;
        !(top >= self.top_end || top + cell.height() as f64 <= self.top_start)
    }
}

/// Recompute visibility for `cells` under `mode`.
///
/// Returns the handles of the cells whose `is_visible` flag flipped. A
/// second call with the same viewport returns nothing.
pub fn cull(
    cells: &mut [Cell],
    viewport: &Viewport,
    margin_ratio: f64,
    mode: GuideMode,
) -> Vec<CellHandle> {
    let mut toggled = Vec::new();

    if mode == GuideMode::All {
        for (i, cell) in cells.iter_mut().enumerate() {
            if !cell.is_visible() {
                cell.set_visible(true);
                toggled.push(CellHandle(i));
            }
        }
        return toggled;
    }

    if !viewport.is_usable() {
        log::debug!("Culler: skipping unusable viewport {:?}", viewport);
        return toggled;
    }

    let bounds = viewport.bounds(margin_ratio);
    for (i, cell) in cells.iter_mut().enumerate() {
        if mode == GuideMode::Sequential && cell.is_visible() {
            continue;
        }
        let visible = bounds.contains(cell);
        if visible != cell.is_visible() {
            cell.set_visible(visible);
            toggled.push(CellHandle(i));
        }
    }

    toggled
}

#[cfg(test)]
#[path = "culler_tests.rs"]
mod culler_tests;
