//! A [`Surface`] that records what was drawn
//!
//! Operations are stored in root coordinates (the current translation is
//! already applied), and text is measured with fixed per-character metrics
//! so layouts are deterministic.

use super::{Bounds, Point, Size, Surface};
use ratatui::style::Color;

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line {
        from: Point,
        to: Point,
    },
    Rect {
        bounds: Bounds,
        line_width: i32,
    },
    FillRect {
        bounds: Bounds,
        color: Color,
    },
    RoundRect {
        bounds: Bounds,
    },
    FillRoundRect {
        bounds: Bounds,
        color: Color,
    },
    Polygon {
        points: Vec<Point>,
    },
    Text {
        text: String,
        at: Point,
    },
}

#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
    origin: Point,
    char_width: i32,
    line_height: i32,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::with_metrics(7, 15)
    }

    pub fn with_metrics(char_width: i32, line_height: i32) -> Self {
        RecordingSurface {
            ops: Vec::new(),
            origin: Point::default(),
            char_width,
            line_height,
        }
    }

    /// Forget everything drawn so far and reset the translation
    pub fn clear(&mut self) {
        self.ops.clear();
        self.origin = Point::default();
    }

    /// All strings drawn, in drawing order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Position of the first occurrence of `text`
    pub fn text_position(&self, text: &str) -> Option<Point> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Text { text: t, at } if t == text => Some(*at),
            _ => None,
        })
    }

    /// Filled polygons; the diagram only fills arrowheads
    pub fn arrowheads(&self) -> Vec<&[Point]> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Polygon { points } => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first op of the given shape, for ordering checks
    pub fn first_index_of(&self, pred: impl Fn(&DrawOp) -> bool) -> Option<usize> {
        self.ops.iter().position(pred)
    }

    fn shift(&self, bounds: Bounds) -> Bounds {
        Bounds::new(
            bounds.x + self.origin.x,
            bounds.y + self.origin.y,
            bounds.width,
            bounds.height,
        )
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RecordingSurface {
    fn measure_text(&self, text: &str) -> Size {
        Size::new(
            text.chars().count() as i32 * self.char_width,
            self.line_height,
        )
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.origin = self.origin + Point::new(dx, dy);
    }

    fn draw_line(&mut self, from: Point, to: Point, _color: Color) {
        self.ops.push(DrawOp::Line {
            from: from + self.origin,
            to: to + self.origin,
        });
    }

    fn draw_rect(&mut self, bounds: Bounds, line_width: i32, _color: Color) {
        let bounds = self.shift(bounds);
        self.ops.push(DrawOp::Rect { bounds, line_width });
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Color) {
        let bounds = self.shift(bounds);
        self.ops.push(DrawOp::FillRect { bounds, color });
    }

    fn draw_round_rect(&mut self, bounds: Bounds, _radius: i32, _color: Color) {
        let bounds = self.shift(bounds);
        self.ops.push(DrawOp::RoundRect { bounds });
    }

    fn fill_round_rect(&mut self, bounds: Bounds, _radius: i32, color: Color) {
        let bounds = self.shift(bounds);
        self.ops.push(DrawOp::FillRoundRect { bounds, color });
    }

    fn fill_polygon(&mut self, points: &[Point], _color: Color) {
        let points = points.iter().map(|p| *p + self.origin).collect();
        self.ops.push(DrawOp::Polygon { points });
    }

    fn draw_string(&mut self, text: &str, at: Point, _color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            at: at + self.origin,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_applies_to_recorded_ops() {
        let mut surface = RecordingSurface::new();
        surface.translate(10, 5);
        surface.draw_string("x", Point::new(1, 1), Color::Reset);
        surface.translate(-10, -5);
        surface.draw_string("y", Point::new(1, 1), Color::Reset);

        assert_eq!(surface.text_position("x"), Some(Point::new(11, 6)));
        assert_eq!(surface.text_position("y"), Some(Point::new(1, 1)));
    }

    #[test]
    fn test_measure_text_counts_chars() {
        let surface = RecordingSurface::with_metrics(8, 16);
        assert_eq!(surface.measure_text("héllo"), Size::new(40, 16));
        assert_eq!(surface.measure_text(""), Size::new(0, 16));
    }
}
