//! Rectangles and viewports.

use cavern_core::Coord;
use serde::{Deserialize, Serialize};

/// Axis-aligned cell rectangle: `[x, x + width) x [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left column (inclusive).
    pub x: u32,
    /// Top row (inclusive).
    pub y: u32,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of cells covered.
    pub fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Geometric center in continuous cell space.
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }

    /// Whether `coord` lies inside.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.x
            && coord.y >= self.y
            && u64::from(coord.x) < u64::from(self.x) + u64::from(self.width)
            && u64::from(coord.y) < u64::from(self.y) + u64::from(self.height)
    }

    /// Covered coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        let (x0, w) = (self.x, self.width);
        (self.y..self.y + self.height)
            .flat_map(move |y| (x0..x0 + w).map(move |x| Coord::new(x, y)))
    }
}

/// The caller's visible window, in continuous cell units.
///
/// Fractional values are allowed so a smoothly scrolling view can be
/// described without rounding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Visible width.
    pub width: f64,
    /// Visible height.
    pub height: f64,
}

impl Viewport {
    /// Create a viewport.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the viewport overlaps `rect` with positive area.
    pub fn intersects(&self, rect: &Rect) -> bool {
        let rx0 = f64::from(rect.x);
        let ry0 = f64::from(rect.y);
        let rx1 = rx0 + f64::from(rect.width);
        let ry1 = ry0 + f64::from(rect.height);
        self.x < rx1 && rx0 < self.x + self.width && self.y < ry1 && ry0 < self.y + self.height
    }
}
