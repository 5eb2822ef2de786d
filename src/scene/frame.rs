//! Stack frame boxes
//!
//! A frame box shows the method signature of one activation and its locals.
//! The active (innermost) frame gets a heavier border and may be followed by
//! a greyed return-value box holding the value most recently returned into it.

use super::columns::{Column, ColumnTable};
use crate::config::Metrics;
use crate::introspect::{short_type_name, FrameInfo, Variable};
use crate::render::{Bounds, Point, Size, Surface};
use crate::ui::theme::DEFAULT_THEME;

/// Declaring types of synthetic lambda frames contain this marker
pub const LAMBDA_TYPE_MARKER: &str = "$$Lambda$";

/// Name of the synthetic local some backends add to lambda frames
pub const LAMBDA_VARIABLE: &str = "Lambda";

/// `Type::method(Arg, Arg) on line N`, or the frame's own name when the
/// backend has no type information
pub fn frame_label(frame: &FrameInfo) -> String {
    let mut label = match (&frame.declaring_type, &frame.method) {
        (Some(declaring_type), Some(method)) => {
            let args = frame
                .argument_types
                .iter()
                .map(|t| short_type_name(t))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}::{}({})", short_type_name(declaring_type), method, args)
        }
        _ => frame.name.clone(),
    };
    if frame.line >= 1 {
        label.push_str(&format!(" on line {}", frame.line));
    }
    label
}

/// Locals worth showing: no synthetic lambda marker, no statics
pub fn is_displayed_local(variable: &Variable) -> bool {
    variable.name != LAMBDA_VARIABLE && !variable.is_static
}

/// Synthetic lambda frames are hidden unless they are executing
pub fn is_displayed_frame(frame: &FrameInfo, active: bool) -> bool {
    active
        || !frame
            .declaring_type
            .as_deref()
            .is_some_and(|t| t.contains(LAMBDA_TYPE_MARKER))
}

/// Full width of a frame box for the given table
pub fn frame_width(table: &ColumnTable, metrics: &Metrics) -> i32 {
    let edge = metrics.border + metrics.padding;
    edge + table.total() + edge
}

#[derive(Debug, Clone)]
pub struct FrameNode {
    pub label: String,
    pub label_extent: Size,
    pub active: bool,
}

impl FrameNode {
    pub fn new(frame: &FrameInfo, active: bool, surface: &dyn Surface) -> Self {
        let label = frame_label(frame);
        FrameNode {
            label_extent: surface.measure_text(&label),
            label,
            active,
        }
    }

    /// Offset of the first row below the label
    pub fn rows_top(&self, metrics: &Metrics) -> i32 {
        metrics.border + metrics.padding + self.label_extent.height + metrics.padding
    }

    /// The label must fit across both columns
    pub fn desired_width(&self, column: Column, table: &ColumnTable, metrics: &Metrics) -> i32 {
        let other = match column {
            Column::Names => table.values(),
            Column::Values => table.names(),
        };
        metrics.min_column_width.max(self.label_extent.width - other)
    }

    pub fn paint(&self, surface: &mut dyn Surface, size: Size, metrics: &Metrics) {
        let bounds = Bounds::new(0, 0, size.width, size.height);
        surface.fill_rect(bounds, DEFAULT_THEME.frame_bg);
        let line_width = if self.active { 2 } else { 1 };
        let border = if self.active {
            DEFAULT_THEME.border_focused
        } else {
            DEFAULT_THEME.border_normal
        };
        surface.draw_rect(bounds, line_width, border);
        surface.draw_string(
            &self.label,
            Point::new(
                (size.width - self.label_extent.width) / 2,
                metrics.border + metrics.padding,
            ),
            DEFAULT_THEME.function,
        );
    }
}

/// Transient box below the active frame holding the last returned value
#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnFrameNode;

impl ReturnFrameNode {
    pub fn paint(&self, surface: &mut dyn Surface, size: Size) {
        let bounds = Bounds::new(0, 0, size.width, size.height);
        surface.fill_rect(bounds, DEFAULT_THEME.return_bg);
        surface.draw_rect(bounds, 1, DEFAULT_THEME.return_value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingSurface;

    #[test]
    fn test_label_with_type_information() {
        let frame = FrameInfo::method(
            "demo.LinkedList",
            "append",
            &["java.lang.Object", "int"],
            17,
        );
        assert_eq!(frame_label(&frame), "LinkedList::append(Object, int) on line 17");
    }

    #[test]
    fn test_label_falls_back_to_name_and_skips_unknown_line() {
        let frame = FrameInfo::named("<native frame>");
        assert_eq!(frame_label(&frame), "<native frame>");

        let frame = FrameInfo::method("Main", "main", &[], -1);
        assert_eq!(frame_label(&frame), "Main::main()");
    }

    #[test]
    fn test_local_filtering() {
        assert!(is_displayed_local(&Variable::primitive("x", "int", "1")));
        assert!(!is_displayed_local(&Variable::primitive("Lambda", "", "")));
        assert!(!is_displayed_local(
            &Variable::primitive("COUNT", "int", "1").into_static()
        ));
    }

    #[test]
    fn test_lambda_frames_hidden_unless_active() {
        let frame = FrameInfo::method("demo.Main$$Lambda$14/0x1", "run", &[], 0);
        assert!(!is_displayed_frame(&frame, false));
        assert!(is_displayed_frame(&frame, true));
        assert!(is_displayed_frame(&FrameInfo::named("main"), false));
    }

    #[test]
    fn test_label_width_demand() {
        let surface = RecordingSurface::new();
        let metrics = Metrics::default();
        let node = FrameNode::new(&FrameInfo::named("a_rather_long_frame_name"), true, &surface);
        let table = ColumnTable::new(60, 50);
        // 24 chars * 7 px = 168
        assert_eq!(node.desired_width(Column::Names, &table, &metrics), 118);
        assert_eq!(node.desired_width(Column::Values, &table, &metrics), 108);

        let wide = ColumnTable::new(300, 300);
        assert_eq!(node.desired_width(Column::Names, &wide, &metrics), 20);
    }
}
