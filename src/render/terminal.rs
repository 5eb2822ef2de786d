//! [`Surface`] implementation on top of a ratatui [`Buffer`]
//!
//! Scene pixels are mapped onto terminal cells: one cell covers
//! `cell_width × cell_height` pixels. Lines are rasterized with Bresenham in
//! cell space, boxes use box-drawing characters, and fills set the cell
//! background so later (painter's order) content overwrites earlier content.

use super::{Bounds, Point, Size, Surface};
use ratatui::{buffer::Buffer, buffer::Cell, layout::Rect, style::Color};

pub struct TerminalSurface<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    origin: Point,
    cell_width: i32,
    cell_height: i32,
}

struct BoxGlyphs {
    horizontal: char,
    vertical: char,
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
}

const LIGHT: BoxGlyphs = BoxGlyphs {
    horizontal: '─',
    vertical: '│',
    top_left: '┌',
    top_right: '┐',
    bottom_left: '└',
    bottom_right: '┘',
};

const HEAVY: BoxGlyphs = BoxGlyphs {
    horizontal: '━',
    vertical: '┃',
    top_left: '┏',
    top_right: '┓',
    bottom_left: '┗',
    bottom_right: '┛',
};

const ROUNDED: BoxGlyphs = BoxGlyphs {
    horizontal: '─',
    vertical: '│',
    top_left: '╭',
    top_right: '╮',
    bottom_left: '╰',
    bottom_right: '╯',
};

impl<'a> TerminalSurface<'a> {
    /// Draw into `area` of `buf`; pixel `(0, 0)` is the area's top-left cell
    pub fn new(buf: &'a mut Buffer, area: Rect, cell_width: i32, cell_height: i32) -> Self {
        TerminalSurface {
            buf,
            area,
            origin: Point::default(),
            cell_width: cell_width.max(1),
            cell_height: cell_height.max(1),
        }
    }

    /// Convert a surface point to an absolute cell position (may be off-area)
    fn to_cell(&self, p: Point) -> (i32, i32) {
        let x = p.x + self.origin.x;
        let y = p.y + self.origin.y;
        (
            self.area.x as i32 + x.div_euclid(self.cell_width),
            self.area.y as i32 + y.div_euclid(self.cell_height),
        )
    }

    /// Cell range covered by `bounds`, inclusive on both ends
    fn cell_span(&self, bounds: Bounds) -> ((i32, i32), (i32, i32)) {
        let start = self.to_cell(bounds.origin());
        let end = self.to_cell(Point::new(
            bounds.right() - bounds.width.min(1),
            bounds.bottom() - bounds.height.min(1),
        ));
        (start, end)
    }

    fn cell_mut(&mut self, col: i32, row: i32) -> Option<&mut Cell> {
        let area = self.area;
        if col < area.x as i32
            || row < area.y as i32
            || col >= area.right() as i32
            || row >= area.bottom() as i32
        {
            return None;
        }
        self.buf.cell_mut((col as u16, row as u16))
    }

    fn put(&mut self, col: i32, row: i32, ch: char, color: Color) {
        if let Some(cell) = self.cell_mut(col, row) {
            cell.set_char(ch).set_fg(color);
        }
    }

    fn outline(&mut self, bounds: Bounds, glyphs: &BoxGlyphs, color: Color) {
        let ((c0, r0), (c1, r1)) = self.cell_span(bounds);
        for col in c0 + 1..c1 {
            self.put(col, r0, glyphs.horizontal, color);
            self.put(col, r1, glyphs.horizontal, color);
        }
        for row in r0 + 1..r1 {
            self.put(c0, row, glyphs.vertical, color);
            self.put(c1, row, glyphs.vertical, color);
        }
        self.put(c0, r0, glyphs.top_left, color);
        self.put(c1, r0, glyphs.top_right, color);
        self.put(c0, r1, glyphs.bottom_left, color);
        self.put(c1, r1, glyphs.bottom_right, color);
    }

    /// Cell centre in surface pixel coordinates
    fn cell_center(&self, col: i32, row: i32) -> Point {
        Point::new(
            (col - self.area.x as i32) * self.cell_width + self.cell_width / 2 - self.origin.x,
            (row - self.area.y as i32) * self.cell_height + self.cell_height / 2 - self.origin.y,
        )
    }
}

/// Even-odd rule
fn polygon_contains(points: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let lhs = (p.x - a.x) as i64 * (b.y - a.y) as i64;
            let rhs = (b.x - a.x) as i64 * (p.y - a.y) as i64;
            // Sign of the crossing test flips with the edge direction
            if (b.y > a.y && lhs < rhs) || (b.y < a.y && lhs > rhs) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

impl Surface for TerminalSurface<'_> {
    fn measure_text(&self, text: &str) -> Size {
        Size::new(
            text.chars().count() as i32 * self.cell_width,
            self.cell_height,
        )
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.origin = self.origin + Point::new(dx, dy);
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        let (mut x0, mut y0) = self.to_cell(from);
        let (x1, y1) = self.to_cell(to);
        let glyph = match (x1 - x0, y1 - y0) {
            (0, _) => '│',
            (_, 0) => '─',
            (dx, dy) if (dx > 0) == (dy > 0) => '╲',
            _ => '╱',
        };
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, glyph, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn draw_rect(&mut self, bounds: Bounds, line_width: i32, color: Color) {
        let glyphs = if line_width > 1 { &HEAVY } else { &LIGHT };
        self.outline(bounds, glyphs, color);
    }

    fn fill_rect(&mut self, bounds: Bounds, color: Color) {
        if bounds.width <= 0 || bounds.height <= 0 {
            return;
        }
        let ((c0, r0), (c1, r1)) = self.cell_span(bounds);
        for row in r0..=r1 {
            for col in c0..=c1 {
                if let Some(cell) = self.cell_mut(col, row) {
                    cell.set_char(' ').set_bg(color);
                }
            }
        }
    }

    fn draw_round_rect(&mut self, bounds: Bounds, _radius: i32, color: Color) {
        self.outline(bounds, &ROUNDED, color);
    }

    fn fill_round_rect(&mut self, bounds: Bounds, _radius: i32, color: Color) {
        self.fill_rect(bounds, color);
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        let Some(first) = points.first().copied() else {
            return;
        };
        let (mut min, mut max) = (self.to_cell(first), self.to_cell(first));
        for p in points {
            let (c, r) = self.to_cell(*p);
            min = (min.0.min(c), min.1.min(r));
            max = (max.0.max(c), max.1.max(r));
        }
        let mut filled = false;
        for row in min.1..=max.1 {
            for col in min.0..=max.0 {
                if polygon_contains(points, self.cell_center(col, row)) {
                    self.put(col, row, '█', color);
                    filled = true;
                }
            }
        }
        if !filled {
            let (col, row) = self.to_cell(first);
            self.put(col, row, '●', color);
        }
    }

    fn draw_string(&mut self, text: &str, at: Point, color: Color) {
        let (col, row) = self.to_cell(at);
        for (i, ch) in text.chars().enumerate() {
            self.put(col + i as i32, row, ch, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, row: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, row)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn test_string_maps_pixels_to_cells() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        {
            let mut surface = TerminalSurface::new(&mut buf, area, 8, 16);
            surface.translate(16, 16);
            surface.draw_string("hi", Point::new(8, 0), Color::Reset);
        }
        assert_eq!(&row_text(&buf, 1)[..5], "   hi");
    }

    #[test]
    fn test_drawing_is_clipped_to_area() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        {
            let mut surface = TerminalSurface::new(&mut buf, area, 1, 1);
            surface.draw_string("abcdefgh", Point::new(-2, 0), Color::Reset);
            surface.draw_line(Point::new(0, 1), Point::new(100, 1), Color::Reset);
        }
        assert_eq!(row_text(&buf, 0), "cdef");
        assert_eq!(row_text(&buf, 1), "────");
    }

    #[test]
    fn test_heavy_rect_outline() {
        let area = Rect::new(0, 0, 3, 3);
        let mut buf = Buffer::empty(area);
        {
            let mut surface = TerminalSurface::new(&mut buf, area, 1, 1);
            surface.draw_rect(Bounds::new(0, 0, 3, 3), 2, Color::Reset);
        }
        assert_eq!(row_text(&buf, 0), "┏━┓");
        assert_eq!(row_text(&buf, 1), "┃ ┃");
        assert_eq!(row_text(&buf, 2), "┗━┛");
    }

    #[test]
    fn test_polygon_containment() {
        let triangle = [Point::new(0, 0), Point::new(10, 0), Point::new(0, 10)];
        assert!(polygon_contains(&triangle, Point::new(2, 2)));
        assert!(!polygon_contains(&triangle, Point::new(8, 8)));
    }
}
