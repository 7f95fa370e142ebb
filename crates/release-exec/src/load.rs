use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rexec_config::{PluginConfig, ShellOption, find_project_config};
use rexec_core::LifecycleEvent;
use rexec_dispatch::RuntimeContext;
use rexec_process::OutputSink;
use serde_json::{Map, Value};

use crate::cli::{ContextArgs, OverrideArgs};

pub(crate) fn determine_working_dir(cd: Option<&Path>) -> Result<PathBuf> {
    let cwd = match cd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    if !cwd.is_dir() {
        bail!("Working directory {} does not exist", cwd.display());
    }
    Ok(cwd)
}

/// Turn CLI override flags into the highest-priority config layer.
pub(crate) fn build_overrides(
    args: &OverrideArgs,
    event: Option<LifecycleEvent>,
) -> Result<Option<PluginConfig>> {
    let mut overrides = PluginConfig::default();
    let mut any = false;

    if let Some(template) = &args.event_command {
        let Some(event) = event else {
            bail!("--command needs an event; use --cmd to set the fallback command");
        };
        overrides.set_command(event, template.clone());
        any = true;
    }
    if let Some(cmd) = &args.cmd {
        overrides.cmd = Some(cmd.clone());
        any = true;
    }
    if let Some(shell) = &args.shell {
        overrides.shell = Some(parse_shell(shell));
        any = true;
    }
    if let Some(exec_cwd) = &args.exec_cwd {
        overrides.exec_cwd = Some(exec_cwd.clone());
        any = true;
    }

    Ok(any.then_some(overrides))
}

fn parse_shell(raw: &str) -> ShellOption {
    match raw {
        "true" => ShellOption::Default(true),
        "false" => ShellOption::Default(false),
        path => ShellOption::Path(path.to_string()),
    }
}

/// Load global, project and override layers.
///
/// An explicit `--config` path must exist; otherwise the project file is
/// looked up in `cwd`. `global` is skipped when `None` or missing.
pub(crate) fn load_config(
    cwd: &Path,
    explicit: Option<&Path>,
    global: Option<&Path>,
    overrides: Option<PluginConfig>,
) -> Result<PluginConfig> {
    let project = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {} not found", path.display());
            }
            Some(path.to_path_buf())
        }
        None => find_project_config(cwd),
    };
    rexec_config::load_plugin_config(project.as_deref(), global, overrides)
}

/// Build the runtime context handed to the dispatcher.
///
/// Child stdout goes to our stderr so that stdout carries only the result.
/// Children inherit our environment as-is, so no overlay is added.
pub(crate) fn build_context(cwd: PathBuf, args: &ContextArgs) -> Result<RuntimeContext> {
    let mut values = match &args.context_file {
        Some(path) => read_context_file(path)?,
        None => Map::new(),
    };
    for entry in &args.set {
        apply_set(&mut values, entry)?;
    }

    let sink = OutputSink::stderr();
    Ok(RuntimeContext::new(cwd)
        .with_stdout(sink.clone())
        .with_stderr(sink)
        .with_values(values))
}

fn read_context_file(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse context file {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!(
            "Context file {} must contain a JSON object",
            path.display()
        ),
    }
}

/// Apply one `KEY=VALUE` entry; `a.b.c` nests objects.
pub(crate) fn apply_set(values: &mut Map<String, Value>, entry: &str) -> Result<()> {
    let Some((key, raw)) = entry.split_once('=') else {
        bail!("Invalid --set entry '{entry}': expected KEY=VALUE");
    };
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        bail!("Invalid --set key '{key}'");
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    let (last, parents) = segments
        .split_last()
        .context("--set key must not be empty")?;
    let mut current = values;
    for segment in parents {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot
            .as_object_mut()
            .with_context(|| format!("--set key '{key}' is not an object path"))?;
    }
    current.insert(last.to_string(), value);
    Ok(())
}
