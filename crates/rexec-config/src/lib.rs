//! Plugin configuration for release-exec: loading, command resolution and validation.
//!
//! ## Example Config
//!
//! ```toml
//! verifyConditionsCmd = "./scripts/verify.sh"
//! publishCmd = "./scripts/publish.sh ${nextRelease.version}"
//! cmd = "echo fallback for ${branch.name}"
//! shell = "/bin/bash"
//! execCwd = "packages/app"
//! ```
//!
//! ## Configuration Priority
//!
//! 1. Runtime overrides (CLI params) (highest)
//! 2. Project config (`.rexec.toml`, `.rexec.json` or an explicit path)
//! 3. Global config (`~/.config/release-exec/config.toml`)

pub mod config;
pub mod validate;

pub use config::{
    CommandSource, EffectiveCommand, PROJECT_CONFIG_FILES, PluginConfig, ShellOption,
    find_project_config, global_config_path, load_plugin_config,
};
pub use validate::{validate, validate_all};
