//! Heap objects and the identity registry
//!
//! Object boxes outlive redraw passes. The registry maps each object identity
//! to its node so that the same live object is drawn at the same place every
//! time, however many times it is referenced and however often the program
//! is redrawn. New identities are stacked downward from a placement cursor.

use super::columns::{Column, ColumnTable};
use super::tree::NodeId;
use crate::config::Metrics;
use crate::introspect::{short_type_name, ObjectId, ObjectState};
use crate::render::{Bounds, Point, Size, Surface};
use crate::ui::theme::DEFAULT_THEME;
use rustc_hash::{FxHashMap, FxHashSet};

/// `Class (id=N)`, plus ` (length=N)` for arrays
pub fn object_title(id: ObjectId, state: &ObjectState) -> String {
    let mut title = format!("{} (id={})", short_type_name(&state.type_name), id);
    if let Some(length) = state.array_length {
        title.push_str(&format!(" (length={})", length));
    }
    title
}

#[derive(Debug, Clone)]
pub struct ObjectNode {
    pub id: ObjectId,
    pub title: String,
    pub title_extent: Size,
    /// Field column widths, private to this object
    pub table: ColumnTable,
    pub close_button: NodeId,
}

impl ObjectNode {
    pub fn width(&self, metrics: &Metrics) -> i32 {
        let edge = metrics.border + metrics.padding;
        edge + self.table.total() + edge
    }

    pub fn rows_top(&self, metrics: &Metrics) -> i32 {
        metrics.border + metrics.padding + self.title_extent.height + metrics.padding
    }

    /// The title must fit across both columns
    pub fn desired_width(&self, column: Column, metrics: &Metrics) -> i32 {
        let other = match column {
            Column::Names => self.table.values(),
            Column::Values => self.table.names(),
        };
        metrics.min_column_width.max(self.title_extent.width - other)
    }

    pub fn paint(&self, surface: &mut dyn Surface, size: Size, metrics: &Metrics) {
        let bounds = Bounds::new(0, 0, size.width, size.height);
        let radius = metrics.object_corner_radius;
        surface.fill_round_rect(bounds, radius, DEFAULT_THEME.object_bg);
        surface.draw_round_rect(bounds, radius, DEFAULT_THEME.border_normal);
        surface.draw_string(
            &self.title,
            Point::new(metrics.border + metrics.padding, metrics.border + metrics.padding),
            DEFAULT_THEME.type_name,
        );
    }
}

/// The cross in an object's top-right corner; only drawn while hovered
pub fn paint_close_button(surface: &mut dyn Surface, size: Size, owner_hovered: bool) {
    if owner_hovered {
        surface.draw_line(Point::new(0, 0), Point::new(size.width, size.height), DEFAULT_THEME.error);
        surface.draw_line(Point::new(0, size.height), Point::new(size.width, 0), DEFAULT_THEME.error);
    }
}

#[derive(Debug)]
pub struct HeapRegistry {
    objects: FxHashMap<ObjectId, NodeId>,
    /// Identities already refreshed during the current pass
    refreshed: FxHashSet<ObjectId>,
    next: Point,
    spacing: i32,
}

impl HeapRegistry {
    pub fn new(metrics: &Metrics) -> Self {
        HeapRegistry {
            objects: FxHashMap::default(),
            refreshed: FxHashSet::default(),
            next: Point::new(metrics.heap_start_x, metrics.outer_margin),
            spacing: metrics.heap_spacing,
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<NodeId> {
        self.objects.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (ObjectId, NodeId)> + '_ {
        self.objects.iter().map(|(id, node)| (*id, *node))
    }

    /// Where the next new object goes
    pub fn next_position(&self) -> Point {
        self.next
    }

    /// Record a freshly placed object of the given height and advance the cursor
    pub fn register(&mut self, id: ObjectId, node: NodeId, height: i32) {
        let previous = self.objects.insert(id, node);
        assert!(previous.is_none(), "Object {} registered twice", id);
        self.next.y += height + self.spacing;
    }

    /// Start a new pass: every identity may be refreshed once again
    pub fn begin_pass(&mut self) {
        self.refreshed.clear();
    }

    /// Returns `false` when `id` was already refreshed during this pass
    pub fn mark_refreshed(&mut self, id: ObjectId) -> bool {
        self.refreshed.insert(id)
    }
}
