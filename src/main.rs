use argh::FromArgs;
use minishell::{Interpreter, ShellError, events};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(FromArgs)]
/// Run commands interactively, or from a batch file when one is given.
struct Args {
    #[argh(positional)]
    /// file whose lines are executed in order instead of reading a prompt.
    batch_file: Option<PathBuf>,

    #[argh(switch, short = 'v')]
    /// log debug details for every trace category to stderr.
    verbose: bool,

    #[argh(option)]
    /// log debug details for one category (commands, expansion, history, jobs, parse).
    trace: Vec<String>,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    match events::compose_filter(args.verbose, &args.trace) {
        Ok(filter) => events::init(filter),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }

    let mut shell = Interpreter::default();
    let outcome = match &args.batch_file {
        Some(path) => run_batch(&mut shell, path),
        None => shell.repl(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run_batch(shell: &mut Interpreter, path: &Path) -> anyhow::Result<()> {
    let file = File::open(path).map_err(|source| ShellError::BatchFile {
        path: path.to_path_buf(),
        source,
    })?;
    shell.run_batch(BufReader::new(file))?;
    Ok(())
}
