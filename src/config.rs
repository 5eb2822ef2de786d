//! Layout constants and tunables for the diagram and the terminal host
//!
//! All scene geometry is expressed in integer "pixels". The defaults match a
//! proportional UI font; the terminal host maps pixels to cells through
//! [`TerminalConfig`].

use std::time::Duration;

/// Pixel metrics used by every node of the diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Margin around the call stack column
    pub outer_margin: i32,
    /// Border thickness of frames and objects
    pub border: i32,
    /// Padding inside frames and objects
    pub padding: i32,
    /// Vertical padding above and below a row's text
    pub row_padding: i32,
    /// Horizontal padding between a row's text and its column edge
    pub row_inner_padding: i32,
    /// Lower bound of an auto-fitted column
    pub min_column_width: i32,
    /// Width the column tables start out with
    pub initial_column_width: i32,
    /// Hit tolerance of the names/values column boundary
    pub names_boundary_tolerance: i32,
    /// Hit tolerance of the right edge of the values column
    pub values_boundary_tolerance: i32,
    /// Heap column: x of the first object, relative to the heap
    pub heap_start_x: i32,
    /// Vertical gap between newly placed heap objects
    pub heap_spacing: i32,
    /// Corner radius of heap object boxes
    pub object_corner_radius: i32,
    /// Side length of the close button on heap objects
    pub close_button_size: i32,
    /// Arrows shorter than this are redirected to the farthest corner
    pub min_arrow_length: i32,
    /// Distance from the arrow tip to the arrowhead's base
    pub arrowhead_length: i32,
    /// Full width of the arrowhead's base
    pub arrowhead_width: i32,
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics {
            outer_margin: 4,
            border: 2,
            padding: 3,
            row_padding: 1,
            row_inner_padding: 3,
            min_column_width: 20,
            initial_column_width: 150,
            names_boundary_tolerance: 5,
            values_boundary_tolerance: 10,
            heap_start_x: 30,
            heap_spacing: 10,
            object_corner_radius: 10,
            close_button_size: 10,
            min_arrow_length: 20,
            arrowhead_length: 20,
            arrowhead_width: 10,
        }
    }
}

/// Vertical order of the call stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackOrder {
    /// Outermost frame at the top, active frame at the bottom
    #[default]
    OldestFirst,
    /// Active frame at the top
    NewestFirst,
}

/// Configuration of a [`MachineScene`](crate::scene::MachineScene)
#[derive(Debug, Clone, Default)]
pub struct SceneConfig {
    pub metrics: Metrics,
    pub stack_order: StackOrder,
}

/// Host-side settings for the terminal front end
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfig {
    /// Pixels per terminal column
    pub cell_width: i32,
    /// Pixels per terminal row
    pub cell_height: i32,
    /// Two presses closer together than this form a double click
    pub double_click: Duration,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            cell_width: 8,
            cell_height: 16,
            double_click: Duration::from_millis(400),
        }
    }
}

impl TerminalConfig {
    /// Parse a `WxH` cell size such as `8x16`
    pub fn with_cell_size(mut self, spec: &str) -> Result<Self, String> {
        let (w, h) = spec
            .split_once('x')
            .ok_or_else(|| format!("Invalid cell size '{}', expected WxH", spec))?;
        let parse = |s: &str| {
            s.trim()
                .parse::<i32>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| format!("Invalid cell dimension '{}'", s))
        };
        self.cell_width = parse(w)?;
        self.cell_height = parse(h)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_size_parsing() {
        let config = TerminalConfig::default().with_cell_size("10x20").unwrap();
        assert_eq!(config.cell_width, 10);
        assert_eq!(config.cell_height, 20);

        assert!(TerminalConfig::default().with_cell_size("10").is_err());
        assert!(TerminalConfig::default().with_cell_size("0x20").is_err());
        assert!(TerminalConfig::default().with_cell_size("ax20").is_err());
    }
}
