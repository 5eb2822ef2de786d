//! # Introduction
//!
//! memscope draws the state of a suspended program as a diagram: the call
//! stack on the left, one box per stack frame, and the heap on the right,
//! one box per live object, with arrows from every reference to the object
//! it points at. The diagram is live: it is rebuilt whenever the program
//! changes, and it can be manipulated with the mouse.
//!
//! ## Pipeline
//!
//! ```text
//! Introspector → MachineScene (build, resolve, layout) → Surface
//!                      ↑
//!                 mouse events
//! ```
//!
//! 1. [`introspect`]: the read-only view of the debuggee, behind the
//!    [`introspect::Introspector`] trait.
//! 2. [`scene`]: the node tree, column tables, arrow routing, and
//!    [`scene::MachineScene`], which runs redraw passes and routes input.
//! 3. [`render`]: the [`render::Surface`] drawing trait with a ratatui
//!    backend and a recording backend.
//! 4. [`config`]: layout metrics and host settings.
//! 5. [`ui`]: ratatui-based terminal host; not part of the stable library API.
//!
//! ## Behaviour worth knowing
//!
//! Heap objects keep their position for as long as they live, however the
//! program changes. Double-clicking a column boundary fits the column to its
//! content; double-clicking a collapsed reference brings its object back.

pub mod config;
pub mod introspect;
pub mod render;
pub mod scene;
pub mod ui;
