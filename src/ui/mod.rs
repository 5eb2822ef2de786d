//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI is organized into four parts:
//!
//! - **[`app`]**: event loop, stepping, mouse forwarding, double-click detection
//! - **[`demo`]**: scripted debuggee states to step through
//! - **[`status`]**: the status bar
//! - **[`theme`]**: centralized color palette used by the diagram and the status bar
//!
//! The entry point for consumers is [`App`]: construct it with the steps of a
//! scenario and call [`App::run`] to start the event loop.
//!
//! [`App::run`]: app::App::run

pub mod app;
pub mod demo;
pub mod status;
pub mod theme;

pub use app::{App, RedrawSignal};
