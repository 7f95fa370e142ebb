//! Lifecycle dispatch: binds release lifecycle events to shell commands.
//!
//! Each dispatch is independent: check the event is configured, validate,
//! render the template, run it, then shape the result by event class.

pub mod context;
pub mod dispatcher;

pub use context::RuntimeContext;
pub use dispatcher::{Dispatcher, render_command};
