use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config_cmds;
mod load;
mod report;
mod run_cmd;

use cli::{Cli, Commands};
use run_cmd::GlobalOpts;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for results.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .ok();

    let opts = GlobalOpts {
        format: cli.format,
        config: cli.config,
        global_config: rexec_config::global_config_path(),
        cd: cli.cd,
    };

    match cli.command {
        Commands::Run {
            event,
            context,
            overrides,
            timeout_secs,
            strict,
        } => {
            let exit_code =
                run_cmd::handle_run(event, context, overrides, timeout_secs, strict, opts).await?;
            std::process::exit(exit_code);
        }
        Commands::Render {
            event,
            context,
            overrides,
        } => {
            let exit_code = run_cmd::handle_render(event, context, overrides, opts)?;
            std::process::exit(exit_code);
        }
        Commands::Check { overrides } => {
            let exit_code = config_cmds::handle_check(overrides, opts)?;
            std::process::exit(exit_code);
        }
        Commands::Events { overrides } => {
            config_cmds::handle_events(overrides, opts)?;
        }
    }

    Ok(())
}
