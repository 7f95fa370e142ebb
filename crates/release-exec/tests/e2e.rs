// End-to-end tests for the rexec binary.

use std::path::Path;
use std::process::{Command, Output};

fn rexec(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rexec"))
        .arg("--cd")
        .arg(cwd)
        .args(args)
        // Keep the user's global config out of the picture.
        .env("XDG_CONFIG_HOME", cwd.join(".xdg"))
        .env("HOME", cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run rexec")
}

#[test]
fn cli_help_displays_correctly() {
    let output = Command::new(env!("CARGO_BIN_EXE_rexec"))
        .arg("--help")
        .output()
        .expect("failed to run rexec --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("release lifecycle events"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("render"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("events"));
}

#[test]
fn run_publish_prints_release_info_only() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".rexec.toml"),
        r#"publishCmd = "echo building >&2; echo '{\"name\": \"npm\", \"version\": \"${nextRelease.version}\"}'""#,
    )
    .unwrap();

    let output = rexec(
        dir.path(),
        &["run", "publish", "--set", "nextRelease.version=1.4.0"],
    );

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["name"], "npm");
    assert_eq!(value["version"], "1.4.0");

    // Child output is forwarded to stderr.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("building"));
}

#[test]
fn failing_gate_exits_nonzero_with_details() {
    let dir = tempfile::tempdir().unwrap();

    let output = rexec(
        dir.path(),
        &[
            "run",
            "verifyConditions",
            "--command",
            "echo 'GH_TOKEN missing'; exit 1",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("EVERIFYCONDITIONS"), "{stderr}");
    assert!(stderr.contains("GH_TOKEN missing"));
}

#[test]
fn failing_success_notification_is_lenient_unless_strict() {
    let dir = tempfile::tempdir().unwrap();

    let output = rexec(dir.path(), &["run", "success", "--command", "exit 4"]);
    assert!(output.status.success());

    let output = rexec(
        dir.path(),
        &["run", "success", "--command", "exit 4", "--strict"],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unconfigured_event_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();

    let output = rexec(dir.path(), &["run", "prepare"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn render_uses_fallback_cmd() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".rexec.json"),
        r#"{"cmd": "./release.sh ${nextRelease.version} <%= branch.name %>"}"#,
    )
    .unwrap();

    let output = rexec(
        dir.path(),
        &[
            "render",
            "prepare",
            "--set",
            "nextRelease.version=2.0.0",
            "--set",
            "branch.name=main",
        ],
    );

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "./release.sh 2.0.0 main"
    );
}

#[test]
fn check_reports_every_problem_as_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".rexec.json"),
        r#"{"prepareCmd": "", "shell": false, "execCwd": " "}"#,
    )
    .unwrap();

    let output = rexec(dir.path(), &["check", "--format", "json"]);

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    let codes: Vec<&str> = report["events"][0]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["EINVALIDSHELL", "EINVALIDEXECCWD", "EINVALIDCMD"]);
}

#[cfg(unix)]
#[test]
fn non_utf8_environment_is_passed_through() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_rexec"))
        .arg("--cd")
        .arg(dir.path())
        .args(["run", "analyzeCommits", "--command", "echo \"$REXEC_PLAIN\""])
        .env("XDG_CONFIG_HOME", dir.path().join(".xdg"))
        .env("HOME", dir.path())
        .env(OsStr::from_bytes(b"REXEC_BAD_\xff"), "x")
        .env("REXEC_PLAIN", OsStr::from_bytes(b"minor"))
        .output()
        .expect("failed to run rexec");

    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "minor");
}
