/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Status given to a stage whose program could not be found.
pub const EXIT_NOT_FOUND: ExitCode = 127;

/// Status given to a stage whose program was found but could not be executed.
pub const EXIT_NOT_EXECUTABLE: ExitCode = 126;

/// One command of a pipeline: program name followed by its arguments.
///
/// Built only from non-empty argument vectors; see [`Stage::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    argv: Vec<String>,
}

impl Stage {
    /// Wrap an argument vector, rejecting an empty one.
    pub fn new(argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            None
        } else {
            Some(Self { argv })
        }
    }

    /// Program to run.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// The full argument vector.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

/// Ordered stages whose standard streams are chained together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
    background: bool,
}

impl Pipeline {
    /// Build a pipeline from at least one stage.
    pub fn new(stages: Vec<Stage>, background: bool) -> Option<Self> {
        if stages.is_empty() {
            None
        } else {
            Some(Self { stages, background })
        }
    }

    /// Stages in left-to-right order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Whether the shell should return without waiting.
    pub fn is_background(&self) -> bool {
        self.background
    }

    /// Number of stages; always at least one.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always `false`: a pipeline holds at least one stage.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
