//! Rendering of dispatch results for the terminal.

use rexec_config::PluginConfig;
use rexec_core::{DispatchError, LifecycleEvent, Outcome, OutputFormat, ValidationErrors};
use serde_json::{Value, json};

/// What to print on stdout for a successful dispatch, if anything.
pub(crate) fn format_outcome(
    event: LifecycleEvent,
    outcome: &Outcome,
    format: &OutputFormat,
) -> Option<String> {
    match format {
        OutputFormat::Json => Some(
            json!({
                "event": event.as_str(),
                "outcome": outcome,
            })
            .to_string(),
        ),
        OutputFormat::Text => match outcome {
            Outcome::Text(text) => Some(text.clone()),
            Outcome::Structured(value) => {
                Some(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
            }
            Outcome::NotConfigured | Outcome::Empty => None,
        },
    }
}

pub(crate) fn format_error(error: &DispatchError, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Json => error_json(error).to_string(),
        OutputFormat::Text => {
            let mut out = match error {
                DispatchError::Config { event, errors } => {
                    format!("{event}: {}", validation_lines(errors))
                }
                _ => format!("[{}] {error}", error.code()),
            };
            let details = error.details();
            if !details.is_empty() && !matches!(error, DispatchError::Config { .. }) {
                out.push_str("\n\n");
                out.push_str(&details);
            }
            out
        }
    }
}

fn error_json(error: &DispatchError) -> Value {
    let errors = match error {
        DispatchError::Config { errors, .. } => errors
            .iter()
            .map(|e| {
                json!({
                    "code": e.code(),
                    "key": e.key(),
                    "message": e.message(),
                    "details": e.details(),
                })
            })
            .collect(),
        _ => vec![json!({
            "code": error.code(),
            "message": error.to_string(),
            "details": error.details(),
        })],
    };
    json!({
        "event": error.event().as_str(),
        "fatal": error.is_fatal(),
        "errors": errors,
    })
}

fn validation_lines(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|e| format!("\n  [{}] {}\n    {}", e.code(), e.message(), e.details()))
        .collect()
}

/// Summary of `check`: every configured event and its problems.
pub(crate) fn format_check(
    config: &PluginConfig,
    problems: &[(LifecycleEvent, ValidationErrors)],
    format: &OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => {
            let events: Vec<Value> = config
                .configured_events()
                .into_iter()
                .map(|event| {
                    let errors: Vec<Value> = problems
                        .iter()
                        .filter(|(e, _)| *e == event)
                        .flat_map(|(_, errors)| errors.iter())
                        .map(|e| json!({"code": e.code(), "message": e.message(), "details": e.details()}))
                        .collect();
                    json!({
                        "event": event.as_str(),
                        "valid": errors.is_empty(),
                        "errors": errors,
                    })
                })
                .collect();
            json!({"valid": problems.is_empty(), "events": events}).to_string()
        }
        OutputFormat::Text => {
            let configured = config.configured_events();
            if configured.is_empty() {
                return "No events configured".to_string();
            }
            let mut lines = Vec::new();
            for event in configured {
                match problems.iter().find(|(e, _)| *e == event) {
                    Some((_, errors)) => {
                        lines.push(format!("✗ {event}{}", validation_lines(errors)));
                    }
                    None => lines.push(format!("✓ {event}")),
                }
            }
            lines.join("\n")
        }
    }
}

/// Table of events with the template each would run.
pub(crate) fn format_events(config: &PluginConfig, format: &OutputFormat) -> String {
    let rows: Vec<(LifecycleEvent, Option<&str>, &'static str)> = LifecycleEvent::ALL
        .into_iter()
        .map(|event| {
            let effective = config.effective_command(event);
            let template = config
                .is_configured(event)
                .then_some(effective.template)
                .flatten();
            (event, template, effective.key)
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let events: Vec<Value> = rows
                .iter()
                .map(|(event, template, key)| {
                    json!({
                        "event": event.as_str(),
                        "configured": template.is_some(),
                        "key": template.map(|_| *key),
                        "command": template,
                    })
                })
                .collect();
            Value::Array(events).to_string()
        }
        OutputFormat::Text => rows
            .iter()
            .map(|(event, template, key)| match template {
                Some(template) => format!("{:<17} {key}: {template}", event.as_str()),
                None => format!("{:<17} -", event.as_str()),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
