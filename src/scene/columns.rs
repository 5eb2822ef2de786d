//! Shared column widths
//!
//! Every row of one visual table (all stack frames, or the fields of one
//! heap object) holds a clone of the same [`ColumnTable`]. Resizing writes
//! the shared cell once and every row picks the new widths up on the next
//! layout pass.

use crate::config::Metrics;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub names: i32,
    pub values: i32,
}

/// Which column of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Names,
    Values,
}

#[derive(Debug, Clone)]
pub struct ColumnTable(Rc<Cell<ColumnWidths>>);

impl ColumnTable {
    pub fn new(names: i32, values: i32) -> Self {
        ColumnTable(Rc::new(Cell::new(ColumnWidths { names, values })))
    }

    /// A table with both columns at the configured initial width
    pub fn initial(metrics: &Metrics) -> Self {
        Self::new(metrics.initial_column_width, metrics.initial_column_width)
    }

    pub fn widths(&self) -> ColumnWidths {
        self.0.get()
    }

    pub fn names(&self) -> i32 {
        self.0.get().names
    }

    pub fn values(&self) -> i32 {
        self.0.get().values
    }

    /// Combined width of both columns
    pub fn total(&self) -> i32 {
        let w = self.0.get();
        w.names + w.values
    }

    pub fn width(&self, column: Column) -> i32 {
        match column {
            Column::Names => self.names(),
            Column::Values => self.values(),
        }
    }

    pub fn set_width(&self, column: Column, width: i32) {
        let mut w = self.0.get();
        match column {
            Column::Names => w.names = width,
            Column::Values => w.values = width,
        }
        self.0.set(w);
    }

    /// Whether both handles refer to the same table
    pub fn shares_with(&self, other: &ColumnTable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Column whose right boundary lies within tolerance of local `x`
    pub fn boundary_at(&self, x: i32, metrics: &Metrics) -> Option<Column> {
        let w = self.0.get();
        if (x - w.names).abs() < metrics.names_boundary_tolerance {
            Some(Column::Names)
        } else if (x - w.names - w.values).abs() < metrics.values_boundary_tolerance {
            Some(Column::Values)
        } else {
            None
        }
    }

    /// Set `column` to the largest of `demands`, never below `floor`
    pub fn auto_fit(&self, column: Column, demands: impl IntoIterator<Item = i32>, floor: i32) -> i32 {
        let width = demands.into_iter().fold(floor, i32::max);
        self.set_width(column, width);
        width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_widths() {
        let table = ColumnTable::new(100, 100);
        let row_view = table.clone();
        table.set_width(Column::Names, 42);

        assert_eq!(row_view.names(), 42);
        assert_eq!(row_view.total(), 142);
        assert!(row_view.shares_with(&table));
        assert!(!ColumnTable::new(100, 100).shares_with(&table));
    }

    #[test]
    fn test_boundary_hit_testing() {
        let metrics = Metrics::default();
        let table = ColumnTable::new(100, 50);

        assert_eq!(table.boundary_at(100, &metrics), Some(Column::Names));
        assert_eq!(table.boundary_at(96, &metrics), Some(Column::Names));
        assert_eq!(table.boundary_at(95, &metrics), None);
        assert_eq!(table.boundary_at(141, &metrics), Some(Column::Values));
        assert_eq!(table.boundary_at(159, &metrics), Some(Column::Values));
        assert_eq!(table.boundary_at(160, &metrics), None);
        assert_eq!(table.boundary_at(120, &metrics), None);
    }

    #[test]
    fn test_auto_fit_uses_floor_and_is_idempotent() {
        let table = ColumnTable::new(150, 150);
        assert_eq!(table.auto_fit(Column::Names, [3, 7], 20), 20);
        assert_eq!(table.auto_fit(Column::Values, [30, 70, 12], 20), 70);
        assert_eq!(table.auto_fit(Column::Values, [30, 70, 12], 20), 70);
        assert_eq!(table.widths(), ColumnWidths { names: 20, values: 70 });
    }
}
