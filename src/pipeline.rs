//! Running a [`Pipeline`] as a chain of child processes.
//!
//! Stages are launched left to right. Each stage goes through the same steps:
//!
//! 1. **wire**: take the read end of the previous pipe as stdin and, unless it is
//!    the last stage, create a new pipe whose write end becomes stdout;
//! 2. **spawn**: resolve and launch the program;
//! 3. **close**: the parent's copies of the stage's pipe ends are moved into the
//!    child's `Command` and dropped with it, so each descriptor is closed by
//!    exactly one owner;
//! 4. **release**: the read end of the new pipe is carried to the next stage.
//!
//! Pipe descriptors are created close-on-exec, so a child only ever holds the two
//! ends it was handed as stdin and stdout.

use crate::command::{EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND, ExitCode, Pipeline, Stage};
use crate::env::Environment;
use crate::error::{Result, ShellError};
use crate::external;
use crate::trace_categories;
use os_pipe::PipeReader;
use std::io::{self, Write};
use std::process::{Child, Stdio};

/// Streams attached to the outer ends of a pipeline.
pub struct TerminalIo {
    /// Standard input of the first stage.
    pub stdin: Stdio,
    /// Standard output of the last stage.
    pub stdout: Stdio,
}

impl TerminalIo {
    /// Both ends attached to the shell's own standard streams.
    pub fn inherit() -> Self {
        Self {
            stdin: Stdio::inherit(),
            stdout: Stdio::inherit(),
        }
    }
}

impl Default for TerminalIo {
    fn default() -> Self {
        Self::inherit()
    }
}

/// What happened after a pipeline was launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    /// Foreground pipeline finished; one exit code per stage, left to right.
    Completed(Vec<ExitCode>),
    /// Background pipeline; carries the pid of the last stage that was spawned.
    Background(Option<u32>),
}

/// A child that has been started, or the status it got without ever running.
enum Launched {
    Running(Child),
    Failed(ExitCode),
}

/// Launches pipelines and keeps track of background children until they exit.
#[derive(Default)]
pub struct PipelineExecutor {
    background: Vec<Child>,
}

impl PipelineExecutor {
    /// Create an executor with no background children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `pipeline` with the variables and working directory of `env`.
    ///
    /// A stage whose program cannot be found or executed is reported on `err`
    /// and gets a 127 / 126 status; the other stages still run and see a closed
    /// pipe in its place. Failure to create a pipe, spawn a process or wait on
    /// one is returned as an error. Stages already running at that point are
    /// handed to the background reaper.
    ///
    /// Background pipelines return as soon as every stage is spawned, after
    /// printing the pid of the last one on `out`.
    pub fn execute(
        &mut self,
        pipeline: &Pipeline,
        env: &Environment,
        terminal: TerminalIo,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<PipelineStatus> {
        let launched = self.launch_stages(pipeline.stages(), env, terminal, err)?;

        if pipeline.is_background() {
            let last_pid = launched.iter().rev().find_map(|stage| match stage {
                Launched::Running(child) => Some(child.id()),
                Launched::Failed(_) => None,
            });
            self.background.extend(launched.into_iter().filter_map(|stage| match stage {
                Launched::Running(child) => Some(child),
                Launched::Failed(_) => None,
            }));
            tracing::debug!(target: trace_categories::JOBS, ?last_pid, pending = self.background.len(), "backgrounded");
            if let Some(pid) = last_pid {
                writeln!(out, "[PID {pid} running in background]")?;
            }
            return Ok(PipelineStatus::Background(last_pid));
        }

        self.wait_all(launched).map(PipelineStatus::Completed)
    }

    fn launch_stages(
        &mut self,
        stages: &[Stage],
        env: &Environment,
        terminal: TerminalIo,
        err: &mut dyn Write,
    ) -> Result<Vec<Launched>> {
        let last = stages.len() - 1;
        let TerminalIo { stdin, stdout } = terminal;
        let mut first_stdin = Some(stdin);
        let mut last_stdout = Some(stdout);
        let mut upstream: Option<PipeReader> = None;
        let mut launched = Vec::with_capacity(stages.len());

        for (i, stage) in stages.iter().enumerate() {
            let stage_stdin = match upstream.take() {
                Some(reader) => Stdio::from(reader),
                None => first_stdin.take().unwrap_or_else(Stdio::null),
            };

            let stage_stdout = if i < last {
                let (reader, writer) = match os_pipe::pipe() {
                    Ok(ends) => ends,
                    Err(e) => {
                        self.abandon(launched);
                        return Err(ShellError::Pipe(e));
                    }
                };
                upstream = Some(reader);
                Stdio::from(writer)
            } else {
                last_stdout.take().unwrap_or_else(Stdio::inherit)
            };

            match launch_stage(stage, env, stage_stdin, stage_stdout, err) {
                Ok(stage_launch) => launched.push(stage_launch),
                Err(e) => {
                    self.abandon(launched);
                    return Err(e);
                }
            }
        }

        Ok(launched)
    }

    fn wait_all(&mut self, launched: Vec<Launched>) -> Result<Vec<ExitCode>> {
        let mut codes = Vec::with_capacity(launched.len());
        let mut pending = launched.into_iter();

        while let Some(stage) = pending.next() {
            match stage {
                Launched::Failed(code) => codes.push(code),
                Launched::Running(mut child) => match child.wait() {
                    Ok(status) => codes.push(external::exit_code(status)),
                    Err(e) => {
                        self.background.push(child);
                        self.abandon(pending.collect());
                        return Err(ShellError::Wait(e));
                    }
                },
            }
        }

        tracing::debug!(target: trace_categories::COMMANDS, ?codes, "pipeline finished");
        Ok(codes)
    }

    /// Hand children that will no longer be waited on in the foreground to the reaper.
    fn abandon(&mut self, launched: Vec<Launched>) {
        for stage in launched {
            if let Launched::Running(child) = stage {
                tracing::debug!(target: trace_categories::JOBS, pid = child.id(), "abandoned to reaper");
                self.background.push(child);
            }
        }
    }

    /// Collect every background child that has already exited, without blocking.
    ///
    /// Returns the pid and exit code of each child reaped by this call.
    pub fn reap(&mut self) -> Vec<(u32, ExitCode)> {
        let mut reaped = Vec::new();
        self.background.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                reaped.push((child.id(), external::exit_code(status)));
                false
            }
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(target: trace_categories::JOBS, pid = child.id(), "failed to poll child: {e}");
                false
            }
        });

        for (pid, code) in &reaped {
            tracing::debug!(target: trace_categories::JOBS, pid, code, "reaped");
        }
        reaped
    }

    /// Number of background children that have not been reaped yet.
    pub fn pending(&self) -> usize {
        self.background.len()
    }
}

fn launch_stage(
    stage: &Stage,
    env: &Environment,
    stdin: Stdio,
    stdout: Stdio,
    err: &mut dyn Write,
) -> Result<Launched> {
    let Some(program) = external::resolve(env, stage) else {
        writeln!(err, "{}: command not found", stage.program())?;
        return Ok(Launched::Failed(EXIT_NOT_FOUND));
    };

    tracing::debug!(target: trace_categories::COMMANDS, program = %program.display(), argv = ?stage.argv(), "spawning");
    match external::spawn(&program, stage, env, stdin, stdout) {
        Ok(child) => Ok(Launched::Running(child)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            writeln!(err, "{}: {e}", stage.program())?;
            Ok(Launched::Failed(EXIT_NOT_FOUND))
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            writeln!(err, "{}: {e}", stage.program())?;
            Ok(Launched::Failed(EXIT_NOT_EXECUTABLE))
        }
        Err(e) => Err(ShellError::Spawn {
            program: stage.program().to_owned(),
            source: e,
        }),
    }
}
