use crate::command::{ExitCode, Stage};
use crate::env::Environment;
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

/// Resolve `stage`'s program against the `PATH` of `env`.
pub fn resolve<'a>(env: &Environment, stage: &'a Stage) -> Option<Cow<'a, Path>> {
    let search_paths = env.get_var("PATH").unwrap_or_default();
    find_command_path(OsStr::new(search_paths), Path::new(stage.program()))
}

/// Launch `stage` from the already resolved `program` path.
///
/// The child sees exactly the variables of `env`, runs in `env.current_dir`, and
/// keeps the name the user typed as `argv[0]`. `stdin` and `stdout` are moved
/// into the command and closed in this process as soon as the child exists.
pub fn spawn(
    program: &Path,
    stage: &Stage,
    env: &Environment,
    stdin: Stdio,
    stdout: Stdio,
) -> io::Result<Child> {
    let mut cmd = Command::new(program);
    cmd.args(stage.args())
        .env_clear()
        .envs(&env.vars)
        .current_dir(&env.current_dir)
        .stdin(stdin)
        .stdout(stdout);

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.arg0(stage.program());
    }

    cmd.spawn()
}

/// Exit code reported for a finished child, following shell conventions.
pub fn exit_code(exit_status: ExitStatus) -> ExitCode {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it names a file.
/// - Relative with multiple components (e.g., `bin/sh`) or `./`-prefixed: returns it
///   if it names a file relative to the current directory.
/// - Single path component (no separators): search each directory in `search_paths`
///   (PATH) and return the first file found.
/// - Empty path: returns `None`.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, _) => None,
        (Some(single), None) if !path.is_absolute() && !path.starts_with(".") => {
            find_in_path(search_paths, single.as_os_str()).map(Cow::Owned)
        }
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.is_file())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}
