//! Command template rendering.
//!
//! Templates interpolate values with `${expression}` or `<%= expression %>`,
//! where `expression` is a path into the merged context:
//!
//! ```text
//! ./publish.sh ${nextRelease.version} --channel ${nextRelease.channel}
//! echo "${commits.length} commits, first: ${commits[0].message}"
//! echo ${config.registry}
//! ```
//!
//! Paths that do not resolve render as an empty string. Write `\${` to emit a
//! literal `${` for the shell.

mod path;
mod render;

pub use path::{PathSegment, parse_path};
pub use render::{TemplateContext, format_value, render};
