use anyhow::Result;
use tracing::debug;

use crate::cli::OverrideArgs;
use crate::load::{build_overrides, determine_working_dir};
use crate::report::{format_check, format_events};
use crate::run_cmd::GlobalOpts;

/// Validate every configured event. Exit code 1 when any is invalid.
pub(crate) fn handle_check(overrides: OverrideArgs, opts: GlobalOpts) -> Result<i32> {
    let cwd = determine_working_dir(opts.cd.as_deref())?;
    let overrides = build_overrides(&overrides, None)?;
    let config = opts.load_config(&cwd, overrides)?;

    let problems = rexec_config::validate_all(&config);
    debug!(
        configured = config.configured_events().len(),
        invalid = problems.len(),
        "Validated configuration"
    );
    println!("{}", format_check(&config, &problems, &opts.format));

    Ok(if problems.is_empty() { 0 } else { 1 })
}

pub(crate) fn handle_events(overrides: OverrideArgs, opts: GlobalOpts) -> Result<()> {
    let cwd = determine_working_dir(opts.cd.as_deref())?;
    let overrides = build_overrides(&overrides, None)?;
    let config = opts.load_config(&cwd, overrides)?;

    println!("{}", format_events(&config, &opts.format));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rexec_core::OutputFormat;

    fn opts_for(dir: &std::path::Path) -> GlobalOpts {
        GlobalOpts {
            format: OutputFormat::Json,
            config: None,
            global_config: None,
            cd: Some(dir.to_path_buf()),
        }
    }

    #[test]
    fn test_check_flags_invalid_events() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".rexec.json"),
            r#"{"publishCmd": "./publish.sh", "execCwd": ""}"#,
        )
        .unwrap();

        let code = handle_check(OverrideArgs::default(), opts_for(dir.path())).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn test_check_passes_for_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".rexec.toml"),
            "verifyConditionsCmd = \"./verify.sh\"\nshell = \"/bin/bash\"\n",
        )
        .unwrap();

        let code = handle_check(OverrideArgs::default(), opts_for(dir.path())).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_check_and_events_reject_event_command_override() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = OverrideArgs {
            event_command: Some("./x.sh".to_string()),
            ..Default::default()
        };
        assert!(handle_check(overrides.clone(), opts_for(dir.path())).is_err());
        assert!(handle_events(overrides, opts_for(dir.path())).is_err());
    }

    #[test]
    fn test_parse_errors_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".rexec.toml"), "publishCmd = [").unwrap();
        assert!(handle_events(OverrideArgs::default(), opts_for(dir.path())).is_err());
    }
}
