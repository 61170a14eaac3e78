//! Trace targets used by the shell's `tracing` events.

/// Trace category for command execution.
pub const COMMANDS: &str = "commands";
/// Trace category for variable substitution.
pub const EXPANSION: &str = "expansion";
/// Trace category for the history store.
pub const HISTORY: &str = "history";
/// Trace category for background children.
pub const JOBS: &str = "jobs";
/// Trace category for tokenizing and splitting input.
pub const PARSE: &str = "parse";

/// Every category, in the order they are listed by `--help`.
pub const ALL: &[&str] = &[COMMANDS, EXPANSION, HISTORY, JOBS, PARSE];
