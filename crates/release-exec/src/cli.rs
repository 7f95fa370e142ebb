use clap::{Args, Parser, Subcommand};
use rexec_core::{LifecycleEvent, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rexec")]
#[command(about = "Release Exec: run shell commands at release lifecycle events")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Config file (defaults to .rexec.toml or .rexec.json in the working directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Working directory (defaults to CWD)
    #[arg(long, global = true)]
    pub cd: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the command bound to a lifecycle event
    Run {
        #[arg(value_enum)]
        event: LifecycleEvent,

        #[command(flatten)]
        context: ContextArgs,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Abort the command after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Exit non-zero when a success/fail notification command fails
        #[arg(long)]
        strict: bool,
    },

    /// Print the rendered command for an event without running it
    Render {
        #[arg(value_enum)]
        event: LifecycleEvent,

        #[command(flatten)]
        context: ContextArgs,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Validate every configured event and report all problems
    Check {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// List lifecycle events and whether each has a command
    Events {
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

/// Release metadata made available to templates.
#[derive(Args, Debug, Default, Clone)]
pub struct ContextArgs {
    /// JSON file whose top-level object is merged into the template context
    #[arg(long = "context", value_name = "FILE")]
    pub context_file: Option<PathBuf>,

    /// Template value; dotted keys nest and values are parsed as JSON when possible
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

/// Runtime overrides, applied above the project and global config files.
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Command template for the selected event
    #[arg(long = "command", value_name = "TEMPLATE")]
    pub event_command: Option<String>,

    /// Fallback command template for events without their own
    #[arg(long)]
    pub cmd: Option<String>,

    /// Shell to run commands with (`true` for the default shell)
    #[arg(long)]
    pub shell: Option<String>,

    /// Working directory for commands, relative to --cd
    #[arg(long)]
    pub exec_cwd: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_context() {
        let cli = Cli::try_parse_from([
            "rexec",
            "run",
            "publish",
            "--set",
            "nextRelease.version=2.0.0",
            "--shell",
            "/bin/bash",
            "--timeout-secs",
            "30",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.format, OutputFormat::Json));
        match cli.command {
            Commands::Run {
                event,
                context,
                overrides,
                timeout_secs,
                strict,
            } => {
                assert_eq!(event, LifecycleEvent::Publish);
                assert_eq!(context.set, vec!["nextRelease.version=2.0.0"]);
                assert_eq!(overrides.shell.as_deref(), Some("/bin/bash"));
                assert_eq!(timeout_secs, Some(30));
                assert!(!strict);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_event_names() {
        let cli = Cli::try_parse_from(["rexec", "render", "verifyConditions"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Render {
                event: LifecycleEvent::VerifyConditions,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["rexec", "run", "deploy"]).is_err());
    }
}
