use std::path::PathBuf;

/// Errors produced while parsing, validating or executing a command line.
///
/// Most variants are reported to the user and the shell moves on to the next line.
/// Variants for which [`ShellError::is_fatal`] returns `true` signal resource
/// exhaustion; the dispatch loop ends the session when it sees one.
#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    /// A built-in was invoked with the wrong shape of arguments.
    #[error("{0}")]
    Usage(String),

    /// A stage of a pipeline was empty after substitution.
    #[error("Error: Command is empty.")]
    EmptyCommand,

    /// `history K` referred to an entry that does not exist.
    #[error("Invalid history command number.")]
    HistoryIndex(i64),

    /// `history set N` was given a negative size.
    #[error("Invalid history size.")]
    InvalidHistorySize(i64),

    /// The local variable table is full.
    #[error("local: too many variables (limit {0})")]
    TooManyLocals(usize),

    /// `cd` could not switch to the requested directory.
    #[error("cd failed: {}: {source}", .path.display())]
    ChangeDir {
        /// Directory that was requested.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// The batch file given on the command line could not be opened.
    #[error("Error opening batch file: {}: {source}", .path.display())]
    BatchFile {
        /// Path of the batch file.
        path: PathBuf,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// A pipe between two stages could not be created.
    #[error("couldn't create pipe: {0}")]
    Pipe(#[source] std::io::Error),

    /// A child process could not be created.
    #[error("fork failed: {program}: {source}")]
    Spawn {
        /// Program that was being launched.
        program: String,
        /// Underlying failure.
        source: std::io::Error,
    },

    /// Waiting on a foreground child failed.
    #[error("wait failed: {0}")]
    Wait(#[source] std::io::Error),

    /// Writing shell output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// Returns `true` for resource failures that should end the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::Pipe(_) | ShellError::Spawn { .. } | ShellError::Wait(_)
        )
    }

    /// Returns `true` when the diagnostic belongs on standard output rather than
    /// standard error.
    pub fn reports_to_stdout(&self) -> bool {
        matches!(
            self,
            ShellError::Usage(_) | ShellError::EmptyCommand | ShellError::HistoryIndex(_)
        )
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ShellError>;
