//! Plugin configuration model and layered loading.

use anyhow::{Context, Result, bail};
use rexec_core::LifecycleEvent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Project config file names, probed in order.
pub const PROJECT_CONFIG_FILES: [&str; 2] = [".rexec.toml", ".rexec.json"];

/// Shell used to run commands: `true` for the platform default, or a shell path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShellOption {
    Default(bool),
    Path(String),
}

impl ShellOption {
    /// `true` or a non-blank shell path.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Default(flag) => *flag,
            Self::Path(path) => !path.trim().is_empty(),
        }
    }

    /// Explicit shell path, if one was configured.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path),
            Self::Default(_) => None,
        }
    }
}

impl fmt::Display for ShellOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(flag) => write!(f, "{flag}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

/// Command templates bound to lifecycle events plus the cross-cutting options.
///
/// Keys follow the release host's camelCase naming. Keys this struct does not
/// know are kept in `extra` and reachable from templates as `config.<key>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_conditions_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyze_commits_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_release_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_notes_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepare_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_channel_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_cmd: Option<String>,
    /// Fallback template for events without their own command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<ShellOption>,
    /// Working directory override, resolved against the runtime cwd.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_cwd: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Where the effective command of an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    EventSpecific,
    Fallback,
}

/// The command template chosen for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveCommand<'a> {
    pub source: CommandSource,
    /// Configuration key the template was read from (`publishCmd`, `cmd`, ...).
    pub key: &'static str,
    pub template: Option<&'a str>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl PluginConfig {
    /// Event-specific template field, without fallback.
    pub fn command(&self, event: LifecycleEvent) -> Option<&str> {
        self.command_slot(event).as_deref()
    }

    /// Set the event-specific template.
    pub fn set_command(&mut self, event: LifecycleEvent, template: impl Into<String>) {
        *self.command_slot_mut(event) = Some(template.into());
    }

    fn command_slot(&self, event: LifecycleEvent) -> &Option<String> {
        match event {
            LifecycleEvent::VerifyConditions => &self.verify_conditions_cmd,
            LifecycleEvent::AnalyzeCommits => &self.analyze_commits_cmd,
            LifecycleEvent::VerifyRelease => &self.verify_release_cmd,
            LifecycleEvent::GenerateNotes => &self.generate_notes_cmd,
            LifecycleEvent::Prepare => &self.prepare_cmd,
            LifecycleEvent::Publish => &self.publish_cmd,
            LifecycleEvent::AddChannel => &self.add_channel_cmd,
            LifecycleEvent::Success => &self.success_cmd,
            LifecycleEvent::Fail => &self.fail_cmd,
        }
    }

    fn command_slot_mut(&mut self, event: LifecycleEvent) -> &mut Option<String> {
        match event {
            LifecycleEvent::VerifyConditions => &mut self.verify_conditions_cmd,
            LifecycleEvent::AnalyzeCommits => &mut self.analyze_commits_cmd,
            LifecycleEvent::VerifyRelease => &mut self.verify_release_cmd,
            LifecycleEvent::GenerateNotes => &mut self.generate_notes_cmd,
            LifecycleEvent::Prepare => &mut self.prepare_cmd,
            LifecycleEvent::Publish => &mut self.publish_cmd,
            LifecycleEvent::AddChannel => &mut self.add_channel_cmd,
            LifecycleEvent::Success => &mut self.success_cmd,
            LifecycleEvent::Fail => &mut self.fail_cmd,
        }
    }

    /// An event is configured when its own key or the `cmd` fallback is present.
    ///
    /// Presence, not content: an empty template still counts so that
    /// validation can report it.
    pub fn is_configured(&self, event: LifecycleEvent) -> bool {
        self.command_slot(event).is_some() || self.cmd.is_some()
    }

    /// Resolve the template to run for `event`.
    ///
    /// A non-empty event-specific template wins, then a non-empty fallback.
    /// When neither has content, whichever is present is returned so the
    /// validator can quote it.
    pub fn effective_command(&self, event: LifecycleEvent) -> EffectiveCommand<'_> {
        let specific = EffectiveCommand {
            source: CommandSource::EventSpecific,
            key: event.config_key(),
            template: self.command(event),
        };
        let fallback = EffectiveCommand {
            source: CommandSource::Fallback,
            key: "cmd",
            template: self.cmd.as_deref(),
        };

        if non_empty(self.command_slot(event)).is_some() {
            specific
        } else if non_empty(&self.cmd).is_some() {
            fallback
        } else if specific.template.is_none() && fallback.template.is_some() {
            fallback
        } else {
            specific
        }
    }

    /// Events that have a command bound, in lifecycle order.
    pub fn configured_events(&self) -> Vec<LifecycleEvent> {
        LifecycleEvent::ALL
            .into_iter()
            .filter(|event| self.is_configured(*event))
            .collect()
    }

    /// Load from a TOML or JSON file, chosen by extension (TOML otherwise).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: Self = if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config at {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config at {}", path.display()))?
        };

        config.warn_unknown_command_keys(path);
        Ok(config)
    }

    /// Unrecognized `*Cmd` keys are most likely misspelled event keys.
    fn warn_unknown_command_keys(&self, path: &Path) {
        for key in self.extra.keys().filter(|k| k.ends_with("Cmd")) {
            tracing::warn!(
                key = %key,
                path = %path.display(),
                "Unknown command key in config; it will not be bound to any event"
            );
        }
    }

    /// Merge another config into self, with `other` taking priority per field.
    pub fn merge_with(&mut self, other: Self) {
        for event in LifecycleEvent::ALL {
            if let Some(template) = other.command_slot(event).clone() {
                *self.command_slot_mut(event) = Some(template);
            }
        }
        if other.cmd.is_some() {
            self.cmd = other.cmd;
        }
        if other.shell.is_some() {
            self.shell = other.shell;
        }
        if other.exec_cwd.is_some() {
            self.exec_cwd = other.exec_cwd;
        }
        for (key, value) in other.extra {
            self.extra.insert(key, value);
        }
    }

    /// Config as the `config` namespace seen by templates.
    ///
    /// `shell` and `execCwd` shape how the command runs and are left out.
    pub fn to_template_value(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self)
            .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));
        if let Some(map) = value.as_object_mut() {
            map.remove("shell");
            map.remove("execCwd");
        }
        value
    }
}

/// First project config file present in `dir`.
pub fn find_project_config(dir: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Resolve the global config path
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "release-exec")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load plugin config with 3-tier priority:
/// 1. runtime_overrides (CLI params) (highest)
/// 2. project config
/// 3. global config
///
/// Missing files are skipped. A file that exists but cannot be read or parsed
/// is an error.
pub fn load_plugin_config(
    project_path: Option<&Path>,
    global_path: Option<&Path>,
    runtime_overrides: Option<PluginConfig>,
) -> Result<PluginConfig> {
    let mut config = PluginConfig::default();

    for (layer, path) in [("global", global_path), ("project", project_path)] {
        let Some(path) = path else { continue };
        if !path.exists() {
            tracing::debug!(layer, path = %path.display(), "Config file not found, skipping");
            continue;
        }
        if path.is_dir() {
            bail!("{layer} config path {} is a directory", path.display());
        }
        tracing::debug!(layer, path = %path.display(), "Loading config layer");
        config.merge_with(PluginConfig::load_from_file(path)?);
    }

    if let Some(overrides) = runtime_overrides {
        config.merge_with(overrides);
    }

    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
