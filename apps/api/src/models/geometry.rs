//! Plain geometry shared by every planner: points, sizes, rectangles and
//! per-side inset records. All coordinates are `f64` pixels; rounding happens
//! only when a value is written back to a node.

use serde::{Deserialize, Serialize};

/// Width × height pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// `width / max(height, 1)` — never divides by zero.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height.max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle. `x`/`y` are the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// True when `other` lies fully inside `self`, with `tolerance` pixels of slack.
    pub fn contains_rect(&self, other: &Rect, tolerance: f64) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }

    /// Position and size multiplied by `factor`, as when the parent is scaled about its origin.
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(self.x * factor, self.y * factor, self.width * factor, self.height * factor)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shrink by per-side insets. Sizes never go below zero.
    pub fn inset(&self, insets: &Insets) -> Rect {
        Rect::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.left - insets.right).max(0.0),
            (self.height - insets.top - insets.bottom).max(0.0),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Per-side distances. Used for safe-area insets, padding and content margins.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Insets {
    pub const fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Distances from the edges of `inner` to the edges of `outer`.
    /// Negative when `inner` pokes out of `outer`.
    pub fn between(outer: &Rect, inner: &Rect) -> Self {
        Self::new(
            inner.x - outer.x,
            outer.right() - inner.right(),
            inner.y - outer.y,
            outer.bottom() - inner.bottom(),
        )
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.left * factor,
            self.right * factor,
            self.top * factor,
            self.bottom * factor,
        )
    }

    pub fn clamp_non_negative(&self) -> Self {
        Self::new(
            self.left.max(0.0),
            self.right.max(0.0),
            self.top.max(0.0),
            self.bottom.max(0.0),
        )
    }

    pub fn rounded(&self) -> Self {
        Self::new(
            self.left.round(),
            self.right.round(),
            self.top.round(),
            self.bottom.round(),
        )
    }
}

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// `(start, length)` of `rect` along this axis.
    pub fn span(self, rect: &Rect) -> (f64, f64) {
        match self {
            Axis::Horizontal => (rect.x, rect.width),
            Axis::Vertical => (rect.y, rect.height),
        }
    }

    pub fn length(self, size: &Size) -> f64 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    /// Builds a rect from `(start, length)` along this axis and along the cross axis.
    pub fn compose(self, main: (f64, f64), cross: (f64, f64)) -> Rect {
        match self {
            Axis::Horizontal => Rect::new(main.0, cross.0, main.1, cross.1),
            Axis::Vertical => Rect::new(cross.0, main.0, cross.1, main.1),
        }
    }

    /// `(start, end)` insets along this axis.
    pub fn insets(self, insets: &Insets) -> (f64, f64) {
        match self {
            Axis::Horizontal => (insets.left, insets.right),
            Axis::Vertical => (insets.top, insets.bottom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_guards_zero_height() {
        assert_eq!(Size::new(300.0, 0.0).aspect_ratio(), 300.0);
        assert_eq!(Size::new(1920.0, 1080.0).aspect_ratio(), 1920.0 / 1080.0);
    }

    #[test]
    fn test_union_spans_both_rects() {
        let a = Rect::new(10.0, 10.0, 20.0, 20.0);
        let b = Rect::new(50.0, 0.0, 10.0, 5.0);
        assert_eq!(a.union(&b), Rect::new(10.0, 0.0, 50.0, 30.0));
    }

    #[test]
    fn test_insets_between_reports_negative_overflow() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(-5.0, 10.0, 50.0, 95.0);
        let m = Insets::between(&outer, &inner);
        assert_eq!(m.left, -5.0);
        assert_eq!(m.right, 55.0);
        assert_eq!(m.top, 10.0);
        assert_eq!(m.bottom, -5.0);
    }

    #[test]
    fn test_inset_never_produces_negative_size() {
        let r = Rect::new(0.0, 0.0, 100.0, 40.0).inset(&Insets::uniform(30.0));
        assert_eq!(r.width, 40.0);
        assert_eq!(r.height, 0.0);
    }
}
