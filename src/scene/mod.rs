//! The diagram itself: a tree of boxes, rows and arrows
//!
//! - **[`tree`]**: arena of positioned nodes, coordinate mapping, hover tracking
//! - **[`columns`]**: name/value column widths shared between rows
//! - **[`row`]**: one variable: literal text or a reference to a heap object
//! - **[`frame`]**: stack frame and return-value boxes
//! - **[`heap`]**: heap object boxes and the identity registry
//! - **[`arrow`]**: routing of reference arrows onto their target boxes
//! - **[`machine`]**: [`MachineScene`], which builds, paints and routes input
//!
//! Every node works in its own local coordinate space; the tree composes the
//! offsets when painting and when routing mouse events.

pub mod arrow;
pub mod columns;
pub mod frame;
pub mod heap;
pub mod machine;
pub mod row;
pub mod tree;

pub use columns::{Column, ColumnTable};
pub use machine::{MachineScene, MouseEventKind, NodeKind, RedrawOutcome, NO_PROGRAM_MESSAGE};
pub use tree::{HoverChange, HoverTransition, NodeId, Tree};
