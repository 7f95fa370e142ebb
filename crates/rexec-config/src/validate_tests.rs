use super::*;
use crate::config::ShellOption;
use rexec_core::ErrorCode;

fn with_command(event: LifecycleEvent, template: &str) -> PluginConfig {
    let mut config = PluginConfig::default();
    config.set_command(event, template);
    config
}

#[test]
fn test_validate_succeeds_on_valid_config() {
    let config = PluginConfig {
        publish_cmd: Some("./publish.sh".to_string()),
        shell: Some(ShellOption::Path("/bin/bash".to_string())),
        exec_cwd: Some("dist".to_string()),
        ..Default::default()
    };
    assert!(validate(LifecycleEvent::Publish, &config).is_ok());
}

#[test]
fn test_validate_accepts_default_shell_flag() {
    let mut config = with_command(LifecycleEvent::Prepare, "make");
    config.shell = Some(ShellOption::Default(true));
    assert!(validate(LifecycleEvent::Prepare, &config).is_ok());
}

#[test]
fn test_empty_command_is_invalid_for_every_event() {
    for event in LifecycleEvent::ALL {
        let config = with_command(event, "");
        let errors = validate(event, &config).unwrap_err();
        assert_eq!(errors.codes(), vec![ErrorCode::InvalidCmd], "{event}");

        let err = &errors.errors()[0];
        assert_eq!(err.key(), event.config_key());
        assert!(
            err.details().contains(&format!(
                "Your configuration for the `{}` option is ``.",
                event.config_key()
            )),
            "got: {}",
            err.details()
        );
    }
}

#[test]
fn test_whitespace_command_is_invalid_and_quoted() {
    let config = with_command(LifecycleEvent::GenerateNotes, "  \t");
    let errors = validate(LifecycleEvent::GenerateNotes, &config).unwrap_err();
    assert_eq!(
        errors.errors()[0],
        ConfigError::InvalidCommand {
            key: "generateNotesCmd",
            value: "  \t".to_string(),
        }
    );
}

#[test]
fn test_empty_fallback_is_invalid() {
    let config = PluginConfig {
        cmd: Some(String::new()),
        ..Default::default()
    };
    let errors = validate(LifecycleEvent::Success, &config).unwrap_err();
    assert_eq!(
        errors.errors()[0],
        ConfigError::InvalidCommand {
            key: "successCmd",
            value: String::new(),
        }
    );
}

#[test]
fn test_fallback_satisfies_empty_event_command() {
    let config = PluginConfig {
        fail_cmd: Some(String::new()),
        cmd: Some("echo fallback".to_string()),
        ..Default::default()
    };
    assert!(validate(LifecycleEvent::Fail, &config).is_ok());
}

#[test]
fn test_invalid_shell_and_cwd_reported_together() {
    let config = PluginConfig {
        verify_release_cmd: Some("./verify.sh".to_string()),
        shell: Some(ShellOption::Path(String::new())),
        exec_cwd: Some(String::new()),
        ..Default::default()
    };
    let errors = validate(LifecycleEvent::VerifyRelease, &config).unwrap_err();
    assert_eq!(
        errors.codes(),
        vec![ErrorCode::InvalidShell, ErrorCode::InvalidExecCwd]
    );
}

#[test]
fn test_all_three_violations_collected() {
    let config = PluginConfig {
        prepare_cmd: Some(" ".to_string()),
        shell: Some(ShellOption::Default(false)),
        exec_cwd: Some("   ".to_string()),
        ..Default::default()
    };
    let errors = validate(LifecycleEvent::Prepare, &config).unwrap_err();
    assert_eq!(errors.len(), 3);
    assert_eq!(
        errors.errors()[0],
        ConfigError::InvalidShell {
            key: "prepareCmd",
            value: "false".to_string(),
        }
    );
    assert_eq!(
        errors.codes(),
        vec![
            ErrorCode::InvalidShell,
            ErrorCode::InvalidExecCwd,
            ErrorCode::InvalidCmd
        ]
    );
}

#[test]
fn test_validate_all_reports_per_event() {
    let config = PluginConfig {
        prepare_cmd: Some("make".to_string()),
        publish_cmd: Some(String::new()),
        success_cmd: Some(" ".to_string()),
        ..Default::default()
    };
    let failures = validate_all(&config);
    let events: Vec<_> = failures.iter().map(|(event, _)| *event).collect();
    assert_eq!(
        events,
        vec![LifecycleEvent::Publish, LifecycleEvent::Success]
    );
}

#[test]
fn test_validate_all_empty_config_has_nothing_to_report() {
    assert!(validate_all(&PluginConfig::default()).is_empty());
}

#[test]
fn test_absent_command_is_not_a_violation() {
    assert!(validate(LifecycleEvent::Publish, &PluginConfig::default()).is_ok());

    let config = PluginConfig {
        publish_cmd: Some("./publish.sh".to_string()),
        ..Default::default()
    };
    assert!(validate(LifecycleEvent::Prepare, &config).is_ok());
}

#[test]
fn test_absent_command_still_checks_shared_options() {
    let config = PluginConfig {
        shell: Some(ShellOption::Default(false)),
        ..Default::default()
    };
    let errors = validate(LifecycleEvent::AnalyzeCommits, &config).unwrap_err();
    assert_eq!(errors.codes(), vec![ErrorCode::InvalidShell]);
}
