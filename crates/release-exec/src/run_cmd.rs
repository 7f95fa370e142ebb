use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use rexec_config::PluginConfig;
use rexec_core::{DispatchError, LifecycleEvent, Outcome, OutputFormat};
use rexec_dispatch::{Dispatcher, render_command};
use tracing::{info, warn};

use crate::cli::{ContextArgs, OverrideArgs};
use crate::load::{build_context, build_overrides, determine_working_dir, load_config};
use crate::report::{format_error, format_outcome};

/// Options shared by every subcommand.
pub(crate) struct GlobalOpts {
    pub format: OutputFormat,
    pub config: Option<PathBuf>,
    /// Global config file; `None` skips the global layer.
    pub global_config: Option<PathBuf>,
    pub cd: Option<PathBuf>,
}

impl GlobalOpts {
    pub(crate) fn load_config(
        &self,
        cwd: &Path,
        overrides: Option<PluginConfig>,
    ) -> Result<PluginConfig> {
        load_config(
            cwd,
            self.config.as_deref(),
            self.global_config.as_deref(),
            overrides,
        )
    }
}

pub(crate) async fn handle_run(
    event: LifecycleEvent,
    context: ContextArgs,
    overrides: OverrideArgs,
    timeout_secs: Option<u64>,
    strict: bool,
    opts: GlobalOpts,
) -> Result<i32> {
    let cwd = determine_working_dir(opts.cd.as_deref())?;
    let overrides = build_overrides(&overrides, Some(event))?;
    let config = opts.load_config(&cwd, overrides)?;
    let ctx = build_context(cwd, &context)?;

    let dispatcher = Dispatcher::new();
    let dispatch = dispatcher.dispatch(event, &config, &ctx);
    let result = match timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), dispatch).await {
            Ok(result) => result,
            // Dropping the dispatch future kills the child.
            Err(_) => bail!("{event} command timed out after {secs}s"),
        },
        None => dispatch.await,
    };

    Ok(report_result(event, result, strict, &opts.format))
}

/// Print the result and choose the exit code.
pub(crate) fn report_result(
    event: LifecycleEvent,
    result: Result<Outcome, DispatchError>,
    strict: bool,
    format: &OutputFormat,
) -> i32 {
    match result {
        Ok(outcome) => {
            if outcome == Outcome::NotConfigured {
                info!(event = %event, "No command configured");
            }
            if let Some(out) = format_outcome(event, &outcome, format) {
                println!("{out}");
            }
            0
        }
        Err(error) => {
            eprintln!("{}", format_error(&error, format));
            if error.is_fatal() || strict {
                1
            } else {
                warn!(
                    event = %event,
                    code = %error.code(),
                    "Notification command failed; continuing"
                );
                0
            }
        }
    }
}

pub(crate) fn handle_render(
    event: LifecycleEvent,
    context: ContextArgs,
    overrides: OverrideArgs,
    opts: GlobalOpts,
) -> Result<i32> {
    let cwd = determine_working_dir(opts.cd.as_deref())?;
    let overrides = build_overrides(&overrides, Some(event))?;
    let config = opts.load_config(&cwd, overrides)?;
    let ctx = build_context(cwd, &context)?;

    match render_command(event, &config, &ctx) {
        Ok(Some(script)) => {
            match opts.format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({"event": event.as_str(), "command": script})
                ),
                OutputFormat::Text => println!("{script}"),
            }
            Ok(0)
        }
        Ok(None) => {
            eprintln!("No command configured for {event}");
            Ok(0)
        }
        Err(error) => {
            eprintln!("{}", format_error(&error, &opts.format));
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rexec_core::{ErrorCode, ProcessError};

    fn process_error(event: LifecycleEvent) -> DispatchError {
        DispatchError::Process {
            event,
            source: ProcessError {
                command: "./notify.sh".to_string(),
                exit_code: Some(2),
                stdout: String::new(),
                stderr: "boom".to_string(),
                spawn_error: None,
            },
        }
    }

    #[test]
    fn test_success_outcomes_exit_zero() {
        let format = OutputFormat::Text;
        assert_eq!(
            report_result(LifecycleEvent::Publish, Ok(Outcome::Empty), false, &format),
            0
        );
        assert_eq!(
            report_result(LifecycleEvent::Prepare, Ok(Outcome::NotConfigured), false, &format),
            0
        );
    }

    #[test]
    fn test_notification_failures_are_lenient_unless_strict() {
        let format = OutputFormat::Text;
        let event = LifecycleEvent::Success;
        assert_eq!(report_result(event, Err(process_error(event)), false, &format), 0);
        assert_eq!(report_result(event, Err(process_error(event)), true, &format), 1);
    }

    #[test]
    fn test_fatal_failures_exit_one() {
        let format = OutputFormat::Json;
        let event = LifecycleEvent::Publish;
        assert_eq!(report_result(event, Err(process_error(event)), false, &format), 1);

        let gate = DispatchError::Gate {
            event: LifecycleEvent::VerifyRelease,
            code: ErrorCode::VerifyRelease,
            source: ProcessError::spawn_failed("./verify.sh", "no such file"),
        };
        assert_eq!(
            report_result(LifecycleEvent::VerifyRelease, Err(gate), false, &format),
            1
        );
    }

    #[tokio::test]
    async fn test_handle_run_with_project_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".rexec.toml"),
            "analyzeCommitsCmd = \"echo ${nextRelease.type}\"\n",
        )
        .unwrap();

        let context = ContextArgs {
            context_file: None,
            set: vec!["nextRelease.type=minor".to_string()],
        };
        let opts = GlobalOpts {
            format: OutputFormat::Text,
            config: None,
            global_config: None,
            cd: Some(dir.path().to_path_buf()),
        };
        let code = handle_run(
            LifecycleEvent::AnalyzeCommits,
            context,
            OverrideArgs::default(),
            Some(10),
            false,
            opts,
        )
        .await
        .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_handle_run_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = OverrideArgs {
            event_command: Some("sleep 5".to_string()),
            ..Default::default()
        };
        let opts = GlobalOpts {
            format: OutputFormat::Text,
            config: None,
            global_config: None,
            cd: Some(dir.path().to_path_buf()),
        };
        let err = handle_run(
            LifecycleEvent::Prepare,
            ContextArgs::default(),
            overrides,
            Some(1),
            false,
            opts,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }

    #[tokio::test]
    async fn test_handle_render_reports_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = OverrideArgs {
            event_command: Some("./publish.sh".to_string()),
            shell: Some("".to_string()),
            ..Default::default()
        };
        let opts = GlobalOpts {
            format: OutputFormat::Text,
            config: None,
            global_config: None,
            cd: Some(dir.path().to_path_buf()),
        };
        let code = handle_render(LifecycleEvent::Publish, ContextArgs::default(), overrides, opts)
            .unwrap();
        assert_eq!(code, 1);
    }
}
