use crate::builtin::{self, Action};
use crate::command::{Pipeline, Stage};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::expand;
use crate::history::HistoryStore;
use crate::lexer::{self, Tokens};
use crate::locals::LocalVariables;
use crate::parser::{self, ParsedLine};
use crate::pipeline::{PipelineExecutor, PipelineStatus, TerminalIo};
use crate::trace_categories;
use crate::validate;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{BufRead, Write};

/// Prompt shown before each interactive line.
pub const PROMPT: &str = "wsh> ";

/// Everything a command can read or change, owned by the interpreter and lent
/// to each handler for the duration of one dispatch.
#[derive(Debug, Default)]
pub struct ShellState {
    /// Exported variables, working directory and exit flag.
    pub env: Environment,
    /// Variables set with `local`.
    pub locals: LocalVariables,
    /// Lines previously sent to the pipeline executor.
    pub history: HistoryStore,
}

/// Whether a dispatched line may be added to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recording {
    Enabled,
    Suppressed,
}

/// A minimal shell that runs built-ins in-process and everything else as
/// (possibly piped) child processes.
///
/// Example
/// ```no_run
/// use minishell::Interpreter;
/// let mut sh = Interpreter::default();
/// sh.dispatch("local GREETING=hello").unwrap();
/// sh.dispatch("echo $GREETING | tr a-z A-Z").unwrap();
/// ```
pub struct Interpreter {
    state: ShellState,
    executor: PipelineExecutor,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter over `state` writing its own output to the given streams.
    ///
    /// Child processes always inherit the real standard streams.
    pub fn new(state: ShellState, stdout: Box<dyn Write>, stderr: Box<dyn Write>) -> Self {
        Self {
            state,
            executor: PipelineExecutor::new(),
            stdout,
            stderr,
        }
    }

    /// Shared view of the shell state.
    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Returns `true` once `exit` has run.
    pub fn should_exit(&self) -> bool {
        self.state.env.should_exit
    }

    /// Parse and execute one line of input.
    ///
    /// Usage and resolution errors are reported and swallowed. Only resource
    /// failures (see [`ShellError::is_fatal`]) are returned; the caller decides
    /// whether the session can go on.
    pub fn dispatch(&mut self, line: &str) -> Result<()> {
        self.dispatch_with(line, Recording::Enabled)
    }

    fn dispatch_with(&mut self, line: &str, recording: Recording) -> Result<()> {
        for (pid, code) in self.executor.reap() {
            tracing::debug!(target: trace_categories::JOBS, pid, code, "background child exited");
        }

        let result = self.try_dispatch(line, recording);
        self.stdout.flush()?;
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => self.report(&e),
        }
    }

    fn try_dispatch(&mut self, line: &str, recording: Recording) -> Result<()> {
        match parser::parse_line(line) {
            ParsedLine::Empty => Ok(()),
            ParsedLine::Builtin(tokens) => self.run_builtin(tokens),
            ParsedLine::Pipeline { stages, background } => {
                let pipeline = self.prepare_pipeline(&stages, background)?;
                // Flush before children start writing to the same terminal.
                self.stdout.flush()?;
                let status = self.executor.execute(
                    &pipeline,
                    &self.state.env,
                    TerminalIo::inherit(),
                    &mut *self.stdout,
                    &mut *self.stderr,
                )?;
                if let PipelineStatus::Completed(codes) = &status {
                    tracing::debug!(target: trace_categories::COMMANDS, ?codes, "foreground done");
                }
                if recording == Recording::Enabled {
                    self.state.history.record(line);
                }
                Ok(())
            }
        }
    }

    fn run_builtin(&mut self, tokens: Tokens) -> Result<()> {
        if tokens.background {
            tracing::debug!(target: trace_categories::COMMANDS, "'&' ignored for builtin");
        }
        let argv = expand::expand_argv(&tokens.argv, &self.state.env, &self.state.locals);
        validate::validate(&argv)?;

        match builtin::run(&argv, &mut self.state, &mut *self.stdout)? {
            Action::Continue => Ok(()),
            Action::Recall(entry) => {
                tracing::debug!(target: trace_categories::HISTORY, entry = entry.as_str(), "recalling");
                self.dispatch_with(&entry, Recording::Suppressed)
            }
        }
    }

    /// Substitute and validate every stage before anything is spawned.
    fn prepare_pipeline(&self, stages: &[Vec<String>], background: bool) -> Result<Pipeline> {
        let stages = stages
            .iter()
            .map(|words| {
                let argv = expand::expand_argv(words, &self.state.env, &self.state.locals);
                validate::validate(&argv)?;
                Stage::new(argv).ok_or(ShellError::EmptyCommand)
            })
            .collect::<Result<Vec<_>>>()?;
        Pipeline::new(stages, background).ok_or(ShellError::EmptyCommand)
    }

    fn report(&mut self, e: &ShellError) -> Result<()> {
        tracing::debug!(target: trace_categories::COMMANDS, "command failed: {e:?}");
        if e.reports_to_stdout() {
            writeln!(self.stdout, "{e}")?;
            self.stdout.flush()?;
        } else {
            writeln!(self.stderr, "{e}")?;
        }
        Ok(())
    }

    /// Dispatch every line of `input` until it ends or `exit` runs.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than ending the run.
    pub fn run_batch(&mut self, mut input: impl BufRead) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            self.dispatch(line.trim_end_matches(['\n', '\r']))?;
            if self.should_exit() {
                break;
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Interactive read-eval loop on the terminal.
    ///
    /// Ends on end-of-input or `exit`. `Ctrl-C` discards the current line.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;

        while !self.should_exit() {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !lexer::is_blank(&line) {
                        rl.add_history_entry(line.as_str())?;
                    }
                    self.dispatch(&line)?;
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Reap whatever background children have finished before the shell goes away.
    pub fn shutdown(&mut self) {
        self.executor.reap();
        if self.executor.pending() > 0 {
            tracing::debug!(
                target: trace_categories::JOBS,
                pending = self.executor.pending(),
                "leaving background children running"
            );
        }
    }
}

impl Default for Interpreter {
    /// An interpreter over the current process environment, writing to the real
    /// standard output and error.
    fn default() -> Self {
        Self::new(
            ShellState::default(),
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }
}
