//! Variable rows: one name/value pair of a frame or object
//!
//! A row measures its text once, at construction. Values that refer to heap
//! objects are not resolved right away: the row records the identity and the
//! scene resolves it after the whole pass has been built, because the target
//! object may not exist yet (or may itself still be under construction).

use super::columns::{Column, ColumnTable};
use super::tree::NodeId;
use crate::config::Metrics;
use crate::introspect::{ObjectId, Variable};
use crate::render::{Bounds, CursorShape, Point, Size, Surface};
use crate::ui::theme::DEFAULT_THEME;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowValue {
    /// Literal shown in the value cell
    Text,
    /// Heap object; `target` is filled in by deferred resolution
    Reference {
        id: ObjectId,
        target: Option<NodeId>,
    },
}

#[derive(Debug, Clone)]
pub struct VariableRow {
    pub name: String,
    pub name_extent: Size,
    /// Value text; for references this is shown while the target is collapsed
    pub display: String,
    pub value_extent: Size,
    pub value: RowValue,
    pub table: ColumnTable,
}

impl VariableRow {
    pub fn new(variable: &Variable, table: ColumnTable, surface: &dyn Surface) -> Self {
        let display = variable.value.display_string();
        let value = match variable.value.object_id() {
            Some(id) => RowValue::Reference { id, target: None },
            None => RowValue::Text,
        };
        VariableRow {
            name_extent: surface.measure_text(&variable.name),
            name: variable.name.clone(),
            value_extent: surface.measure_text(&display),
            display,
            value,
            table,
        }
    }

    pub fn height(&self, metrics: &Metrics) -> i32 {
        metrics.row_padding + self.name_extent.height.max(self.value_extent.height) + metrics.row_padding
    }

    /// Identity still waiting for deferred resolution
    pub fn pending_object(&self) -> Option<ObjectId> {
        match self.value {
            RowValue::Reference { id, target: None } => Some(id),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<NodeId> {
        match self.value {
            RowValue::Reference { target, .. } => target,
            RowValue::Text => None,
        }
    }

    pub fn resolve(&mut self, node: NodeId) {
        if let RowValue::Reference { target, .. } = &mut self.value {
            *target = Some(node);
        }
    }

    /// Stop waiting for the target; the row keeps its text and draws no arrow
    pub fn abandon_reference(&mut self) {
        if self.pending_object().is_some() {
            self.value = RowValue::Text;
        }
    }

    /// Narrowest width of `column` that still fits this row's text
    pub fn desired_width(&self, column: Column, metrics: &Metrics) -> i32 {
        let inner = metrics.row_inner_padding;
        match column {
            Column::Names => self.name_extent.width + inner,
            Column::Values => inner + self.value_extent.width + inner,
        }
    }

    pub fn cursor(&self, x: i32, metrics: &Metrics) -> CursorShape {
        match self.table.boundary_at(x, metrics) {
            Some(_) => CursorShape::ResizeHorizontal,
            None => CursorShape::Arrow,
        }
    }

    /// Paint in local coordinates
    ///
    /// Returns the arrow to draw (start point in local space, target node)
    /// when the value is a reference whose target is shown.
    ///
    /// # Panics
    ///
    /// If the value is a reference that was never resolved.
    pub fn paint(
        &self,
        surface: &mut dyn Surface,
        height: i32,
        metrics: &Metrics,
        is_shown: impl Fn(NodeId) -> bool,
    ) -> Option<(Point, NodeId)> {
        let widths = self.table.widths();
        let inner = metrics.row_inner_padding;
        surface.draw_string(
            &self.name,
            Point::new(widths.names - self.name_extent.width - inner, metrics.row_padding),
            DEFAULT_THEME.fg,
        );
        surface.fill_rect(
            Bounds::new(widths.names + 2, 0, widths.values - 2, height),
            DEFAULT_THEME.value_bg,
        );
        let arrow_target = match self.value {
            RowValue::Text => None,
            RowValue::Reference { id, target: None } => {
                panic!("Reference to object {} painted before it was resolved", id)
            }
            RowValue::Reference {
                target: Some(node), ..
            } => Some(node).filter(|node| is_shown(*node)),
        };
        match arrow_target {
            Some(node) => Some((Point::new(widths.names + widths.values / 2, height / 2), node)),
            None => {
                surface.draw_string(
                    &self.display,
                    Point::new(widths.names + inner, metrics.row_padding),
                    DEFAULT_THEME.value_fg,
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingSurface;

    #[test]
    fn test_primitive_row_is_text() {
        let surface = RecordingSurface::new();
        let row = VariableRow::new(
            &Variable::primitive("count", "int", "12"),
            ColumnTable::new(100, 100),
            &surface,
        );
        assert_eq!(row.value, RowValue::Text);
        assert_eq!(row.display, "12");
        assert_eq!(row.name_extent.width, 35);
        assert_eq!(row.height(&Metrics::default()), 17);
        assert_eq!(row.pending_object(), None);
    }

    #[test]
    fn test_reference_row_waits_for_resolution() {
        let surface = RecordingSurface::new();
        let mut row = VariableRow::new(
            &Variable::object("head", "demo.Node", 42),
            ColumnTable::new(100, 100),
            &surface,
        );
        assert_eq!(row.pending_object(), Some(42));
        assert_eq!(row.display, "Node (id=42)");

        let mut tree = crate::scene::tree::Tree::new();
        let node = tree.insert((), None);
        row.resolve(node);
        assert_eq!(row.pending_object(), None);
        assert_eq!(row.target(), Some(node));
    }

    #[test]
    fn test_abandoned_reference_paints_as_text() {
        let mut surface = RecordingSurface::new();
        let mut row = VariableRow::new(
            &Variable::object("next", "demo.Node", 43),
            ColumnTable::new(100, 100),
            &surface,
        );
        row.abandon_reference();
        assert_eq!(row.pending_object(), None);
        assert_eq!(row.target(), None);
        assert_eq!(row.display, "Node (id=43)");
        assert!(row.paint(&mut surface, 17, &Metrics::default(), |_| true).is_none());
        assert!(surface.texts().contains(&"Node (id=43)"));
    }

    #[test]
    fn test_desired_widths() {
        let metrics = Metrics::default();
        let surface = RecordingSurface::new();
        let row = VariableRow::new(
            &Variable::primitive("ab", "int", "1234"),
            ColumnTable::new(100, 100),
            &surface,
        );
        assert_eq!(row.desired_width(Column::Names, &metrics), 14 + 3);
        assert_eq!(row.desired_width(Column::Values, &metrics), 3 + 28 + 3);
    }

    #[test]
    fn test_text_row_paints_name_right_aligned() {
        let metrics = Metrics::default();
        let mut surface = RecordingSurface::new();
        let row = VariableRow::new(
            &Variable::primitive("x", "int", "1"),
            ColumnTable::new(100, 80),
            &surface,
        );
        let arrow = row.paint(&mut surface, 17, &metrics, |_| true);

        assert!(arrow.is_none());
        assert_eq!(surface.text_position("x"), Some(Point::new(100 - 7 - 3, 1)));
        assert_eq!(surface.text_position("1"), Some(Point::new(103, 1)));
    }

    #[test]
    #[should_panic(expected = "before it was resolved")]
    fn test_unresolved_reference_cannot_paint() {
        let mut surface = RecordingSurface::new();
        let row = VariableRow::new(
            &Variable::object("n", "Node", 1),
            ColumnTable::new(100, 80),
            &surface,
        );
        row.paint(&mut surface, 17, &Metrics::default(), |_| true);
    }
}
