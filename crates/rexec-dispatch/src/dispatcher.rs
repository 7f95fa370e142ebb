//! Dispatcher façade: one entry point per lifecycle event.

use rexec_config::{PluginConfig, ShellOption, validate};
use rexec_core::{DispatchError, ErrorCode, EventClass, LifecycleEvent, Outcome, ProcessError};
use rexec_process::{CommandRunner, RunRequest, ShellRunner};
use rexec_template::{TemplateContext, render};
use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::context::RuntimeContext;

/// Validate and render the command for `event` without running it.
///
/// Returns `Ok(None)` when the event has no command configured.
pub fn render_command(
    event: LifecycleEvent,
    config: &PluginConfig,
    ctx: &RuntimeContext,
) -> Result<Option<String>, DispatchError> {
    if !config.is_configured(event) {
        return Ok(None);
    }
    validate(event, config).map_err(|errors| DispatchError::Config { event, errors })?;

    let template = config.effective_command(event).template.unwrap_or_default();
    let template_ctx = TemplateContext::new(config.to_template_value(), &ctx.values);
    Ok(Some(render(template, &template_ctx)))
}

/// Runs lifecycle event commands through a [`CommandRunner`].
#[derive(Debug, Clone, Default)]
pub struct Dispatcher<R = ShellRunner> {
    runner: R,
}

impl Dispatcher<ShellRunner> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: CommandRunner> Dispatcher<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run the command bound to `event` and shape its result.
    ///
    /// - Unconfigured events return [`Outcome::NotConfigured`] without
    ///   validating, rendering or running anything
    /// - Gate events map a failing command to their own error code
    /// - Text events return trimmed stdout, empty meaning no value
    /// - Structured events parse stdout as JSON; unparsable output is logged
    ///   and ignored because success is decided by the exit code alone
    pub async fn dispatch(
        &self,
        event: LifecycleEvent,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        let span = info_span!("dispatch", event = %event);
        self.dispatch_inner(event, config, ctx).instrument(span).await
    }

    async fn dispatch_inner(
        &self,
        event: LifecycleEvent,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        let Some(script) = render_command(event, config, ctx)? else {
            debug!("No command configured, skipping");
            return Ok(Outcome::NotConfigured);
        };

        info!(script = %script, "Call script");
        let request = RunRequest {
            command: &script,
            shell: config.shell.as_ref().and_then(ShellOption::path),
            cwd: &ctx.cwd,
            exec_cwd: config.exec_cwd.as_deref(),
            env: &ctx.env,
            stdout: &ctx.stdout,
            stderr: &ctx.stderr,
        };
        let result = self.runner.run(request).await;

        match event.class() {
            EventClass::Gate => match result {
                Ok(_) => Ok(Outcome::Empty),
                Err(source) => Err(gate_error(event, source)),
            },
            EventClass::Text => result
                .map(Outcome::from)
                .map_err(|source| DispatchError::Process { event, source }),
            EventClass::SideEffect => result
                .map(|_| Outcome::Empty)
                .map_err(|source| DispatchError::Process { event, source }),
            EventClass::Structured => result
                .map(|stdout| parse_structured(&script, stdout))
                .map_err(|source| DispatchError::Process { event, source }),
        }
    }

    pub async fn verify_conditions(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::VerifyConditions, config, ctx)
            .await
    }

    pub async fn analyze_commits(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::AnalyzeCommits, config, ctx).await
    }

    pub async fn verify_release(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::VerifyRelease, config, ctx).await
    }

    pub async fn generate_notes(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::GenerateNotes, config, ctx).await
    }

    pub async fn prepare(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::Prepare, config, ctx).await
    }

    pub async fn publish(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::Publish, config, ctx).await
    }

    pub async fn add_channel(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::AddChannel, config, ctx).await
    }

    pub async fn success(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::Success, config, ctx).await
    }

    pub async fn fail(
        &self,
        config: &PluginConfig,
        ctx: &RuntimeContext,
    ) -> Result<Outcome, DispatchError> {
        self.dispatch(LifecycleEvent::Fail, config, ctx).await
    }
}

fn gate_error(event: LifecycleEvent, source: ProcessError) -> DispatchError {
    match ErrorCode::for_gate(event) {
        Some(code) => DispatchError::Gate {
            event,
            code,
            source,
        },
        None => DispatchError::Process { event, source },
    }
}

fn parse_structured(script: &str, stdout: String) -> Outcome {
    if stdout.is_empty() {
        return Outcome::Empty;
    }
    match serde_json::from_str::<Value>(&stdout) {
        Ok(value) => Outcome::Structured(value),
        Err(e) => {
            warn!(
                script = %script,
                stdout = %stdout,
                error = %e,
                "Command wrote invalid JSON to stdout; the stdout content will be ignored"
            );
            Outcome::Empty
        }
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
