//! Drawing surface abstraction
//!
//! The diagram never talks to a concrete graphics API. Everything it draws
//! goes through [`Surface`], which offers text measurement and a handful of
//! primitives in an ambient coordinate frame that callers move with
//! [`Surface::translate`].
//!
//! - [`terminal`]: a surface that rasterizes onto a ratatui [`Buffer`]
//! - [`recording`]: a surface that records operations, used by tests
//!
//! [`Buffer`]: ratatui::buffer::Buffer

pub mod recording;
pub mod terminal;

use ratatui::style::Color;
use std::ops::{Add, Sub};

/// Integer point in scene pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Squared Euclidean distance
    pub fn distance_squared(self, other: Point) -> i64 {
        let dx = (other.x - self.x) as i64;
        let dy = (other.y - self.y) as i64;
        dx * dx + dy * dy
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Text extent or node size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Bounds {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, point: Point) -> bool {
        self.x <= point.x && point.x < self.right() && self.y <= point.y && point.y < self.bottom()
    }
}

/// Pointer shape requested by the node under the mouse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Arrow,
    /// Column boundary: dragging/double-clicking resizes horizontally
    ResizeHorizontal,
}

/// A 2D drawing target with text measurement
///
/// All coordinates are relative to the current translation. Implementations
/// must accumulate [`translate`](Surface::translate) calls.
pub trait Surface {
    /// Extent of `text` when drawn with [`draw_string`](Surface::draw_string)
    fn measure_text(&self, text: &str) -> Size;

    /// Move the coordinate origin by `(dx, dy)`
    fn translate(&mut self, dx: i32, dy: i32);

    fn draw_line(&mut self, from: Point, to: Point, color: Color);

    /// Outline a rectangle; `line_width` greater than one draws a heavier border
    fn draw_rect(&mut self, bounds: Bounds, line_width: i32, color: Color);

    fn fill_rect(&mut self, bounds: Bounds, color: Color);

    fn draw_round_rect(&mut self, bounds: Bounds, radius: i32, color: Color);

    fn fill_round_rect(&mut self, bounds: Bounds, radius: i32, color: Color);

    fn fill_polygon(&mut self, points: &[Point], color: Color);

    /// Draw `text` with its top-left corner at `at`
    fn draw_string(&mut self, text: &str, at: Point, color: Color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains_is_half_open() {
        let b = Bounds::new(10, 20, 5, 5);
        assert!(b.contains(Point::new(10, 20)));
        assert!(b.contains(Point::new(14, 24)));
        assert!(!b.contains(Point::new(15, 24)));
        assert!(!b.contains(Point::new(14, 25)));
        assert!(!b.contains(Point::new(9, 20)));
    }

    #[test]
    fn test_point_arithmetic() {
        let p = Point::new(3, 4) + Point::new(1, 1);
        assert_eq!(p, Point::new(4, 5));
        assert_eq!(p - Point::new(4, 5), Point::default());
        assert_eq!(Point::new(0, 0).distance_squared(Point::new(3, 4)), 25);
    }
}
