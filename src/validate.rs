//! Syntax checks for built-in commands, run before anything is executed.

use crate::error::{Result, ShellError};

/// Check the shape of a substituted, filtered argument vector.
///
/// External commands only need to be non-empty; built-ins are checked against
/// their accepted forms. On failure the returned [`ShellError::Usage`] carries
/// the message shown to the user.
pub fn validate(argv: &[String]) -> Result<()> {
    let Some((name, args)) = argv.split_first() else {
        return Err(ShellError::EmptyCommand);
    };
    if name.is_empty() {
        return Err(ShellError::EmptyCommand);
    }

    match name.as_str() {
        "cd" if args.len() != 1 => Err(usage(
            "cd: wrong number of arguments. Usage: cd <directory>",
        )),
        "exit" if !args.is_empty() => Err(usage("exit: does not take any arguments.")),
        "export" | "local" if !is_single_assignment(args) => Err(usage(format!(
            "{name}: incorrect usage. Expected format: {name} VAR=value"
        ))),
        "history" => validate_history(args),
        "vars" if !args.is_empty() => Err(usage("vars: does not take any arguments.")),
        _ => Ok(()),
    }
}

fn validate_history(args: &[String]) -> Result<()> {
    match args {
        [] => Ok(()),
        [set, size] if set == "set" => {
            if size.parse::<i64>().is_ok() {
                Ok(())
            } else {
                Err(usage("history set: incorrect usage."))
            }
        }
        [set, ..] if set == "set" => Err(usage("history set: incorrect usage.")),
        [index] if index.parse::<i64>().is_ok() => Ok(()),
        _ => Err(usage(
            "history: incorrect usage. Usage: history [set <size> | <n>]",
        )),
    }
}

fn is_single_assignment(args: &[String]) -> bool {
    match args {
        [assignment] => assignment
            .split_once('=')
            .is_some_and(|(name, _)| !name.is_empty()),
        _ => false,
    }
}

fn usage(message: impl Into<String>) -> ShellError {
    ShellError::Usage(message.into())
}
