use crate::event::LifecycleEvent;
use serde::Serialize;
use std::fmt;

/// Machine-readable error kinds reported to the release host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "EINVALIDCMD")]
    InvalidCmd,
    #[serde(rename = "EINVALIDSHELL")]
    InvalidShell,
    #[serde(rename = "EINVALIDEXECCWD")]
    InvalidExecCwd,
    #[serde(rename = "EVERIFYCONDITIONS")]
    VerifyConditions,
    #[serde(rename = "EVERIFYRELEASE")]
    VerifyRelease,
    #[serde(rename = "ECMDFAILED")]
    CommandFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCmd => "EINVALIDCMD",
            Self::InvalidShell => "EINVALIDSHELL",
            Self::InvalidExecCwd => "EINVALIDEXECCWD",
            Self::VerifyConditions => "EVERIFYCONDITIONS",
            Self::VerifyRelease => "EVERIFYRELEASE",
            Self::CommandFailed => "ECMDFAILED",
        }
    }

    /// Classification used when the command of a gate event fails.
    pub fn for_gate(event: LifecycleEvent) -> Option<Self> {
        match event {
            LifecycleEvent::VerifyConditions => Some(Self::VerifyConditions),
            LifecycleEvent::VerifyRelease => Some(Self::VerifyRelease),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single misconfiguration found before any process is spawned.
///
/// `key` is the event-specific configuration key being validated
/// (e.g. `publishCmd`) even when the value came from the `cmd` fallback.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid `{key}` option.")]
    InvalidCommand {
        key: &'static str,
        /// The blank template that was configured.
        value: String,
    },

    #[error("Invalid `shell` option.")]
    InvalidShell { key: &'static str, value: String },

    #[error("Invalid `execCwd` option.")]
    InvalidWorkingDirectory { key: &'static str, value: String },
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCommand { .. } => ErrorCode::InvalidCmd,
            Self::InvalidShell { .. } => ErrorCode::InvalidShell,
            Self::InvalidWorkingDirectory { .. } => ErrorCode::InvalidExecCwd,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::InvalidCommand { key, .. }
            | Self::InvalidShell { key, .. }
            | Self::InvalidWorkingDirectory { key, .. } => key,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Operator-facing explanation quoting the offending value.
    pub fn details(&self) -> String {
        match self {
            Self::InvalidCommand { key, value } => format!(
                "The `{key}` option is required and must be a non empty String.\n\n\
                 Your configuration for the `{key}` option is `{value}`."
            ),
            Self::InvalidShell { value, .. } => format!(
                "The `shell` option, if defined, must be a non empty String or the value `true`.\n\n\
                 Your configuration for the `shell` option is `{value}`."
            ),
            Self::InvalidWorkingDirectory { value, .. } => format!(
                "The `execCwd` option, if defined, must be a non empty String.\n\n\
                 Your configuration for the `execCwd` option is `{value}`."
            ),
        }
    }
}

/// Every violation found while validating one event, raised as one unit.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{} configuration error(s):{}", .0.len(), self.summary())]
pub struct ValidationErrors(Vec<ConfigError>);

impl ValidationErrors {
    /// `Ok(())` for an empty list, otherwise the aggregate.
    pub fn check(errors: Vec<ConfigError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }

    pub fn errors(&self) -> &[ConfigError] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.0.iter().map(ConfigError::code).collect()
    }

    pub fn into_vec(self) -> Vec<ConfigError> {
        self.0
    }

    fn summary(&self) -> String {
        self.0
            .iter()
            .map(|err| format!(" [{}] {err}", err.code()))
            .collect()
    }

    /// Merge another aggregate into this one, keeping order.
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ConfigError;
    type IntoIter = std::slice::Iter<'a, ConfigError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A command that could not be spawned or exited unsuccessfully.
///
/// Output was already streamed live to the caller's sinks; the buffered copies
/// kept here are what end up in error reports.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.summary())]
pub struct ProcessError {
    pub command: String,
    /// `None` for spawn failures and signal termination.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Reason the process could not be started, if it never ran.
    pub spawn_error: Option<String>,
}

impl ProcessError {
    pub fn spawn_failed(command: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self {
            command: command.into(),
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            spawn_error: Some(reason.to_string()),
        }
    }

    fn summary(&self) -> String {
        match (&self.spawn_error, self.exit_code) {
            (Some(reason), _) => format!("Failed to spawn `{}`: {reason}", self.command),
            (None, Some(code)) => format!("Command `{}` exited with code {code}", self.command),
            (None, None) => format!("Command `{}` was terminated by a signal", self.command),
        }
    }

    /// Captured stdout and stderr laid out for an operator.
    pub fn captured_output(&self) -> String {
        let mut out = String::new();
        if !self.stdout.trim().is_empty() {
            out.push_str("stdout:\n");
            out.push_str(self.stdout.trim_end());
        }
        if !self.stderr.trim().is_empty() {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str("stderr:\n");
            out.push_str(self.stderr.trim_end());
        }
        out
    }
}

/// Failure of a single lifecycle dispatch.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("Invalid configuration for {event}: {errors}")]
    Config {
        event: LifecycleEvent,
        #[source]
        errors: ValidationErrors,
    },

    /// A gate event's command failed; the release must abort.
    #[error("{event} failed: {source}")]
    Gate {
        event: LifecycleEvent,
        code: ErrorCode,
        #[source]
        source: ProcessError,
    },

    #[error("{event} command failed: {source}")]
    Process {
        event: LifecycleEvent,
        #[source]
        source: ProcessError,
    },
}

impl DispatchError {
    pub fn event(&self) -> LifecycleEvent {
        match self {
            Self::Config { event, .. } | Self::Gate { event, .. } | Self::Process { event, .. } => {
                *event
            }
        }
    }

    /// Primary classification. Configuration failures report their first violation.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config { errors, .. } => errors
                .errors()
                .first()
                .map_or(ErrorCode::InvalidCmd, ConfigError::code),
            Self::Gate { code, .. } => *code,
            Self::Process { .. } => ErrorCode::CommandFailed,
        }
    }

    /// Every classification carried by this error.
    pub fn codes(&self) -> Vec<ErrorCode> {
        match self {
            Self::Config { errors, .. } => errors.codes(),
            _ => vec![self.code()],
        }
    }

    /// Human-readable detail. Gate failures carry the command's stdout.
    pub fn details(&self) -> String {
        match self {
            Self::Config { errors, .. } => errors
                .iter()
                .map(ConfigError::details)
                .collect::<Vec<_>>()
                .join("\n\n"),
            Self::Gate { source, .. } => {
                if source.stdout.trim().is_empty() {
                    source.stderr.trim().to_string()
                } else {
                    source.stdout.trim().to_string()
                }
            }
            Self::Process { source, .. } => source.captured_output(),
        }
    }

    pub fn process_error(&self) -> Option<&ProcessError> {
        match self {
            Self::Gate { source, .. } | Self::Process { source, .. } => Some(source),
            Self::Config { .. } => None,
        }
    }

    /// Whether the host should abort the release on this error.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Config { .. } | Self::Gate { .. } => true,
            Self::Process { event, .. } => event.failure_is_fatal(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
