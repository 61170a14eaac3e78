//! A small interactive and batch command shell.
//!
//! Lines are either built-in commands (`cd`, `exit`, `history`, `export`,
//! `local`, `vars`) run inside the shell, or pipelines of external programs
//! connected with `|` and run as child processes. Words of the form `$NAME` are
//! replaced by exported or shell-local variables before anything runs.
//!
//! The main entry point is [`Interpreter`], which owns the shell state (exported
//! environment, local variables and command history) and dispatches lines one
//! at a time.

pub mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod events;
pub mod expand;
pub mod external;
pub mod history;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod locals;
pub mod parser;
pub mod pipeline;
pub mod trace_categories;
pub mod validate;

/// Just a convenient re-export of the command interpreter.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Interpreter, PROMPT, ShellState};

pub use error::ShellError;
