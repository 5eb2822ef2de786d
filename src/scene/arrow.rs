//! Arrow routing
//!
//! An arrow starts at a value cell and ends on (or inside) the box of the
//! object it refers to. On each axis independently the end point is:
//!
//! ```text
//! from before the box  →  near edge
//! from within the span →  from's own coordinate (projects straight in)
//! from past the box    →  far edge
//! ```
//!
//! If that leaves an arrow shorter than the minimum length (e.g. the source
//! lies on or inside the target), the arrow is redirected to the diagonally
//! farthest corner instead.

use crate::config::Metrics;
use crate::render::{Bounds, Point, Surface};
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowGeometry {
    pub from: Point,
    pub to: Point,
    /// Apex followed by the two base corners; `None` for a zero-length shaft
    pub head: Option<[Point; 3]>,
}

impl ArrowGeometry {
    pub fn length_squared(&self) -> i64 {
        self.from.distance_squared(self.to)
    }

    pub fn paint(&self, surface: &mut dyn Surface, color: Color) {
        surface.draw_line(self.from, self.to, color);
        if let Some(head) = &self.head {
            surface.fill_polygon(head, color);
        }
    }
}

fn clip_axis(from: i32, start: i32, extent: i32) -> i32 {
    if from < start {
        start
    } else if from < start + extent {
        from
    } else {
        start + extent
    }
}

/// Route an arrow from `from` to `target`, both in root space
pub fn route_arrow(from: Point, target: Bounds, metrics: &Metrics) -> ArrowGeometry {
    let mut to = Point::new(
        clip_axis(from.x, target.x, target.width),
        clip_axis(from.y, target.y, target.height),
    );

    let min = metrics.min_arrow_length as i64;
    if from.distance_squared(to) < min * min {
        to.x = if from.x < target.x + target.width / 2 {
            target.right()
        } else {
            target.x
        };
        to.y = if from.y < target.y + target.height / 2 {
            target.bottom()
        } else {
            target.y
        };
    }

    let length = from.distance_squared(to).isqrt() as i32;
    let head = (length > 0).then(|| {
        let head_length = metrics.arrowhead_length;
        let half_width = metrics.arrowhead_width / 2;
        let base = Point::new(
            to.x + (from.x - to.x) * head_length / length,
            to.y + (from.y - to.y) * head_length / length,
        );
        // Shaft direction rotated by 90°, scaled to the half width
        let side = Point::new(
            (to.y - from.y) * half_width / length,
            (from.x - to.x) * half_width / length,
        );
        [to, base + side, base - side]
    });

    ArrowGeometry { from, to, head }
}
