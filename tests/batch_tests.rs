//! End-to-end tests that run the shell binary on batch files.

// Pipelines rely on coreutils being on PATH.
#![cfg(unix)]

use anyhow::Context;
use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// Write `script` to a batch file and run the shell on it.
fn run_script(dir: &Path, script: &str) -> anyhow::Result<std::process::Output> {
    run_bytes(dir, script.as_bytes(), |_| {})
}

fn run_bytes(
    dir: &Path,
    script: &[u8],
    configure: impl FnOnce(&mut Command),
) -> anyhow::Result<std::process::Output> {
    let batch = dir.join("script.wsh");
    std::fs::write(&batch, script).context("failed to write batch file")?;
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("minishell"));
    cmd.arg(&batch).current_dir(dir).env("PATH", "/usr/bin:/bin");
    configure(&mut cmd);
    let output = cmd.output().context("failed to run shell")?;
    Ok(output)
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn pipeline_output_reaches_stdout() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let output = run_script(dir.path(), "echo hello | tr a-z A-Z\n")?;
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "HELLO\n");
    Ok(())
}

#[test]
fn three_stage_pipeline() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let output = run_script(dir.path(), "printf c\\nb\\na\\n | sort | head -n 2\n")?;
    assert_eq!(stdout_of(&output), "a\nb\n");
    Ok(())
}

#[test]
fn cd_to_missing_directory_keeps_going() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let expected = dir.path().canonicalize()?;
    let output = run_script(dir.path(), "cd /nonexistent\npwd\n")?;

    assert!(output.status.success());
    assert_eq!(stdout_of(&output).trim_end(), expected.to_string_lossy());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cd failed: /nonexistent"), "stderr was: {stderr}");
    Ok(())
}

#[test]
fn cd_changes_where_children_run() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    std::fs::create_dir(dir.path().join("sub"))?;
    let expected = dir.path().join("sub").canonicalize()?;
    let output = run_script(dir.path(), "cd sub\npwd\n")?;
    assert_eq!(stdout_of(&output).trim_end(), expected.to_string_lossy());
    Ok(())
}

#[test]
fn exported_variables_reach_children() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = "export FOO=bar\nprintenv FOO\nexport FOO=\nprintenv FOO\necho done\n";
    let output = run_script(dir.path(), script)?;
    assert_eq!(stdout_of(&output), "bar\ndone\n");
    Ok(())
}

#[test]
fn local_variables_substitute_but_are_not_exported() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = "local WHO=world\necho hello $WHO $MISSING !\nprintenv WHO\necho end\n";
    let output = run_script(dir.path(), script)?;
    assert_eq!(stdout_of(&output), "hello world !\nend\n");
    Ok(())
}

#[test]
fn local_removal_hides_from_vars() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = "local FOO=1\nlocal BAR=2\nlocal FOO=\nvars\n";
    let output = run_script(dir.path(), script)?;
    assert_eq!(stdout_of(&output), "BAR=2\n");
    Ok(())
}

#[test]
fn history_set_evicts_oldest() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = "history set 2\necho A\necho B\necho C\nhistory\n";
    let output = run_script(dir.path(), script)?;
    assert_eq!(stdout_of(&output), "A\nB\nC\n1) echo C\n2) echo B\n");
    Ok(())
}

#[test]
fn history_recall_reruns_entry() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let script = "echo first\necho second\nhistory 2\nhistory\n";
    let output = run_script(dir.path(), script)?;
    assert_eq!(
        stdout_of(&output),
        "first\nsecond\nfirst\n1) echo second\n2) echo first\n"
    );
    Ok(())
}

#[test]
fn exit_stops_reading_the_batch_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let output = run_script(dir.path(), "echo before\nexit\necho after\n")?;
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "before\n");
    Ok(())
}

#[test]
fn unknown_command_is_not_fatal() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let output = run_script(dir.path(), "no-such-command-xyz\necho ok\n")?;
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "ok\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("no-such-command-xyz: command not found"));
    Ok(())
}

#[test]
fn background_command_does_not_block() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let output = run_script(dir.path(), "sleep 0.2 &\necho next\n")?;
    let stdout = stdout_of(&output);
    let mut lines = stdout.lines();
    let first = lines.next().unwrap_or_default();
    assert!(first.starts_with("[PID ") && first.ends_with(" running in background]"), "got {first}");
    assert_eq!(lines.next(), Some("next"));
    Ok(())
}

#[test]
fn invalid_utf8_line_does_not_end_the_batch() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let output = run_bytes(dir.path(), b"echo one\necho \xff\necho three\n", |_| {})?;
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "one\n\u{fffd}\nthree\n");
    Ok(())
}

#[test]
fn non_utf8_environment_is_tolerated() -> anyhow::Result<()> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = TempDir::new()?;
    let output = run_bytes(dir.path(), b"echo alive\n", |cmd| {
        cmd.env("MINISHELL_BAD_BYTES", OsStr::from_bytes(b"\xff\xfe"));
    })?;
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "alive\n");
    Ok(())
}

#[test]
fn missing_batch_file_fails() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    Command::new(assert_cmd::cargo::cargo_bin!("minishell"))
        .arg(dir.path().join("missing.wsh"))
        .assert()
        .failure();
    Ok(())
}

#[test]
fn too_many_arguments_is_a_usage_error() -> anyhow::Result<()> {
    Command::new(assert_cmd::cargo::cargo_bin!("minishell"))
        .args(["a.wsh", "b.wsh"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn interactive_mode_ends_at_eof() -> anyhow::Result<()> {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("minishell"))
        .env("PATH", "/usr/bin:/bin")
        .write_stdin("echo from-stdin\n")
        .output()?;
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("from-stdin"));
    Ok(())
}
