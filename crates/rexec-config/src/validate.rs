use rexec_core::{ConfigError, LifecycleEvent, ValidationErrors};

use crate::config::PluginConfig;

/// Validate the options used to run `event`.
///
/// All violations are collected and returned together. An event with no
/// command at all has nothing to check for the command itself; shell and
/// execCwd are still validated.
pub fn validate(event: LifecycleEvent, config: &PluginConfig) -> Result<(), ValidationErrors> {
    let key = event.config_key();
    let mut errors = Vec::new();

    if let Some(shell) = config.shell.as_ref().filter(|s| !s.is_valid()) {
        errors.push(ConfigError::InvalidShell {
            key,
            value: shell.to_string(),
        });
    }

    if let Some(cwd) = config.exec_cwd.as_ref().filter(|c| c.trim().is_empty()) {
        errors.push(ConfigError::InvalidWorkingDirectory {
            key,
            value: cwd.clone(),
        });
    }

    // An absent command is a skip, not a violation.
    if config.is_configured(event) {
        let template = config.effective_command(event).template.unwrap_or_default();
        if template.trim().is_empty() {
            errors.push(ConfigError::InvalidCommand {
                key,
                value: template.to_string(),
            });
        }
    }

    ValidationErrors::check(errors)
}

/// Validate every configured event, returning the failures per event.
pub fn validate_all(config: &PluginConfig) -> Vec<(LifecycleEvent, ValidationErrors)> {
    config
        .configured_events()
        .into_iter()
        .filter_map(|event| validate(event, config).err().map(|errors| (event, errors)))
        .collect()
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
