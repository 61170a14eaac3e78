use crate::error::{Result, ShellError};
use crate::interpreter::ShellState;
use crate::trace_categories;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Names handled inside the shell instead of by launching a program.
pub const BUILTINS: &[&str] = &["cd", "exit", "history", "export", "local", "vars"];

/// Returns `true` if `name` is one of [`BUILTINS`].
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// What the dispatcher should do once a built-in has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing more; read the next line.
    Continue,
    /// Dispatch this earlier command line again.
    Recall(String),
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// against the shell state without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd".
    fn name() -> &'static str;

    /// Execute against the shell state, writing any output to `stdout`.
    fn execute(self, state: &mut ShellState, stdout: &mut dyn Write) -> Result<Action>;
}

/// Run the built-in named by `argv[0]`.
///
/// `argv` must already have passed [`crate::validate::validate`].
pub fn run(argv: &[String], state: &mut ShellState, stdout: &mut dyn Write) -> Result<Action> {
    let Some((name, args)) = argv.split_first() else {
        return Err(ShellError::EmptyCommand);
    };
    tracing::debug!(target: trace_categories::COMMANDS, name = name.as_str(), ?args, "builtin");

    match name.as_str() {
        "cd" => invoke::<Cd>(args, state, stdout),
        "exit" => invoke::<Exit>(args, state, stdout),
        "history" => invoke::<History>(args, state, stdout),
        "export" => invoke::<Export>(args, state, stdout),
        "local" => invoke::<Local>(args, state, stdout),
        "vars" => invoke::<Vars>(args, state, stdout),
        other => Err(ShellError::Usage(format!("{other}: not a builtin"))),
    }
}

fn invoke<T: BuiltinCommand>(
    args: &[String],
    state: &mut ShellState,
    stdout: &mut dyn Write,
) -> Result<Action> {
    let operands = as_operands(args);
    match T::from_args(&[T::name()], &operands) {
        Ok(cmd) => cmd.execute(state, stdout),
        Err(EarlyExit { output, .. }) => Err(ShellError::Usage(output.trim_end().to_owned())),
    }
}

/// No built-in declares flags, so words argh would read as a flag or as a help
/// request (`-1`, `help`) are passed after `--`.
fn as_operands(args: &[String]) -> Vec<&str> {
    let mut words = Vec::with_capacity(args.len() + 1);
    let mut escaped = false;
    for arg in args {
        if !escaped && (arg.starts_with('-') || arg == "help") {
            words.push("--");
            escaped = true;
        }
        words.push(arg.as_str());
    }
    words
}

/// A `NAME=VALUE` operand, split at the first `=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Variable name; never empty.
    pub name: String,
    /// New value, possibly empty.
    pub value: String,
}

fn assignment(word: &str) -> std::result::Result<Assignment, String> {
    match word.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok(Assignment {
            name: name.to_owned(),
            value: value.to_owned(),
        }),
        _ => Err(format!("expected NAME=VALUE, got `{word}`")),
    }
}

#[derive(FromArgs, Debug)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, state: &mut ShellState, _stdout: &mut dyn Write) -> Result<Action> {
        let target = PathBuf::from(&self.target);
        let new_dir = if target.is_absolute() {
            target
        } else {
            state.env.current_dir.join(target)
        };

        let canonical = fs::canonicalize(&new_dir).map_err(|source| ShellError::ChangeDir {
            path: new_dir.clone(),
            source,
        })?;
        env::set_current_dir(&canonical).map_err(|source| ShellError::ChangeDir {
            path: canonical.clone(),
            source,
        })?;
        state.env.current_dir = canonical;
        Ok(Action::Continue)
    }
}

#[derive(FromArgs, Debug)]
/// Ask the shell to terminate with a success status.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, state: &mut ShellState, _stdout: &mut dyn Write) -> Result<Action> {
        state.env.should_exit = true;
        Ok(Action::Continue)
    }
}

#[derive(FromArgs, Debug, PartialEq, Eq)]
/// List the recorded command lines, resize the history or run an entry again.
pub struct History {
    #[argh(positional)]
    /// entry to run again, counting from 1 at the most recent line.
    pub index: Option<i64>,

    #[argh(subcommand)]
    pub set: Option<HistorySet>,
}

#[derive(FromArgs, Debug, PartialEq, Eq)]
#[argh(subcommand, name = "set")]
/// Change how many command lines are kept.
pub struct HistorySet {
    #[argh(positional)]
    /// new capacity; 0 stops recording.
    pub size: i64,
}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, state: &mut ShellState, stdout: &mut dyn Write) -> Result<Action> {
        match (self.set, self.index) {
            (Some(HistorySet { size }), _) => {
                state.history.resize(size)?;
                Ok(Action::Continue)
            }
            (None, Some(k)) => Ok(Action::Recall(state.history.get(k)?.to_owned())),
            (None, None) => {
                for (n, line) in state.history.list() {
                    writeln!(stdout, "{n}) {line}")?;
                }
                Ok(Action::Continue)
            }
        }
    }
}

#[derive(FromArgs, Debug)]
/// Set an exported variable; an empty value unsets it.
pub struct Export {
    #[argh(positional, from_str_fn(assignment))]
    /// variable to export, as NAME=VALUE.
    pub assignment: Assignment,
}

impl BuiltinCommand for Export {
    fn name() -> &'static str {
        "export"
    }

    fn execute(self, state: &mut ShellState, _stdout: &mut dyn Write) -> Result<Action> {
        let Assignment { name, value } = self.assignment;
        state.env.export(&name, &value);
        Ok(Action::Continue)
    }
}

#[derive(FromArgs, Debug)]
/// Set a shell-local variable; an empty value removes it.
pub struct Local {
    #[argh(positional, from_str_fn(assignment))]
    /// variable to set, as NAME=VALUE.
    pub assignment: Assignment,
}

impl BuiltinCommand for Local {
    fn name() -> &'static str {
        "local"
    }

    fn execute(self, state: &mut ShellState, _stdout: &mut dyn Write) -> Result<Action> {
        let Assignment { name, value } = self.assignment;
        state.locals.set(&name, &value)?;
        Ok(Action::Continue)
    }
}

#[derive(FromArgs, Debug)]
/// Print every local variable as NAME=VALUE.
pub struct Vars {}

impl BuiltinCommand for Vars {
    fn name() -> &'static str {
        "vars"
    }

    fn execute(self, state: &mut ShellState, stdout: &mut dyn Write) -> Result<Action> {
        for (name, value) in state.locals.iter() {
            writeln!(stdout, "{name}={value}")?;
        }
        Ok(Action::Continue)
    }
}
