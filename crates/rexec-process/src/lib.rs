//! Process execution: shell spawning, live output forwarding and capture.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use rexec_core::ProcessError;
use tokio::process::Command;
use tracing::debug;

mod sink;
mod tee;

pub use sink::{CaptureBuffer, OutputSink};

/// Everything needed to run one rendered command.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    /// Fully rendered command line.
    pub command: &'a str,
    /// Explicit shell path; `None` uses the platform default shell.
    pub shell: Option<&'a str>,
    /// Base working directory of the invocation.
    pub cwd: &'a Path,
    /// Override resolved against `cwd`.
    pub exec_cwd: Option<&'a str>,
    /// Variables layered over the inherited process environment.
    pub env: &'a HashMap<String, String>,
    pub stdout: &'a OutputSink,
    pub stderr: &'a OutputSink,
}

impl RunRequest<'_> {
    pub fn working_dir(&self) -> PathBuf {
        resolve_working_dir(self.cwd, self.exec_cwd)
    }
}

/// Executes rendered commands on behalf of the dispatcher.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and return stdout trimmed of surrounding whitespace.
    async fn run(&self, request: RunRequest<'_>) -> Result<String, ProcessError>;
}

/// Runs commands through a shell as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, request: RunRequest<'_>) -> Result<String, ProcessError> {
        run_command(request).await
    }
}

/// `exec_cwd` joined onto `cwd`; an absolute override replaces `cwd`.
pub fn resolve_working_dir(cwd: &Path, exec_cwd: Option<&str>) -> PathBuf {
    match exec_cwd {
        Some(dir) => cwd.join(dir),
        None => cwd.to_path_buf(),
    }
}

/// Build `<shell> -c <command>` (or `cmd /C` on Windows).
fn shell_command(shell: Option<&str>, command: &str) -> Command {
    #[cfg(windows)]
    let (program, flag) = match shell {
        Some(path) => {
            let is_cmd = Path::new(path)
                .file_stem()
                .is_some_and(|stem| stem.eq_ignore_ascii_case("cmd"));
            (path, if is_cmd { "/C" } else { "-c" })
        }
        None => ("cmd", "/C"),
    };
    #[cfg(not(windows))]
    let (program, flag) = (shell.unwrap_or("sh"), "-c");

    let mut cmd = Command::new(program);
    cmd.arg(flag).arg(command);
    cmd
}

/// Spawn `request.command` through a shell and wait for it.
///
/// - Stdout and stderr are forwarded chunk by chunk to the request's sinks
///   while the child runs, and buffered at the same time
/// - Sinks are flushed but never shut down
/// - Stdin is null
/// - The child is killed if the returned future is dropped
///
/// Exit code zero resolves to the trimmed stdout. Anything else yields a
/// [`ProcessError`] carrying both buffered streams.
pub async fn run_command(request: RunRequest<'_>) -> Result<String, ProcessError> {
    let work_dir = request.working_dir();
    let mut cmd = shell_command(request.shell, request.command);
    cmd.current_dir(&work_dir)
        .envs(request.env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(cwd = %work_dir.display(), shell = ?request.shell, "Spawning command");
    let mut child = cmd
        .spawn()
        .map_err(|e| ProcessError::spawn_failed(request.command, e))?;

    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();
    let (stdout, stderr) = tokio::join!(
        tee::tee_stream(child_stdout, request.stdout),
        tee::tee_stream(child_stderr, request.stderr),
    );

    let status = child.wait().await.map_err(|e| ProcessError {
        command: request.command.to_string(),
        exit_code: None,
        stdout: stdout.clone(),
        stderr: stderr.clone(),
        spawn_error: Some(format!("failed to wait for child: {e}")),
    })?;

    debug!(exit_code = ?status.code(), "Command finished");
    if status.success() {
        Ok(stdout.trim().to_string())
    } else {
        Err(ProcessError {
            command: request.command.to_string(),
            exit_code: status.code(),
            stdout,
            stderr,
            spawn_error: None,
        })
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
