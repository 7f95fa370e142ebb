//! Shared types for release-exec: lifecycle events, outcomes and the error taxonomy.

pub mod error;
pub mod event;
pub mod types;

pub use error::{ConfigError, DispatchError, ErrorCode, ProcessError, ValidationErrors};
pub use event::{EventClass, LifecycleEvent};
pub use types::{OutputFormat, Outcome};
