//! Classifies an input line as a built-in invocation or a pipeline of external
//! commands, and splits pipelines into their stages.

use crate::builtin;
use crate::lexer::{self, Tokens};
use crate::trace_categories;

/// Separator between pipeline stages.
pub const PIPE: char = '|';

/// An input line after tokenization but before substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Nothing but whitespace.
    Empty,
    /// The first word names a built-in; the whole line is its argument vector.
    Builtin(Tokens),
    /// One or more external commands joined by `|`.
    Pipeline {
        /// Raw words of each stage, left to right.
        stages: Vec<Vec<String>>,
        /// Set when the last stage ended with `&`.
        background: bool,
    },
}

/// Parse a single line of input.
///
/// Built-ins are recognized by the first word of the line and are never piped;
/// any `|` after a built-in name is just another argument. Everything else is
/// split on `|`, and each stage is tokenized separately. Only the trailing `&`
/// of the last stage makes the pipeline run in the background.
pub fn parse_line(line: &str) -> ParsedLine {
    let Some(first) = lexer::first_token(line) else {
        return ParsedLine::Empty;
    };

    if builtin::is_builtin(first) {
        return ParsedLine::Builtin(lexer::split_into_tokens(line));
    }

    let segments: Vec<&str> = line.split(PIPE).collect();
    let last = segments.len() - 1;
    let mut background = false;
    let mut stages = Vec::with_capacity(segments.len());

    for (i, segment) in segments.into_iter().enumerate() {
        let tokens = lexer::split_into_tokens(segment);
        if i == last {
            background = tokens.background;
        } else if tokens.background {
            tracing::debug!(target: trace_categories::PARSE, stage = i, "ignoring '&' before '|'");
        }
        stages.push(tokens.argv);
    }

    tracing::debug!(target: trace_categories::PARSE, stages = stages.len(), background, "parsed pipeline");
    ParsedLine::Pipeline { stages, background }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(parse_line(""), ParsedLine::Empty);
        assert_eq!(parse_line("   \n"), ParsedLine::Empty);
    }

    #[test]
    fn builtin_takes_whole_line() {
        let parsed = parse_line("cd /tmp | cat");
        assert_eq!(
            parsed,
            ParsedLine::Builtin(Tokens {
                argv: argv(&["cd", "/tmp", "|", "cat"]),
                background: false,
            })
        );
    }

    #[test]
    fn single_external_command() {
        assert_eq!(
            parse_line("ls -l"),
            ParsedLine::Pipeline {
                stages: vec![argv(&["ls", "-l"])],
                background: false,
            }
        );
    }

    #[test]
    fn pipeline_is_split_on_bars() {
        assert_eq!(
            parse_line("echo hello | tr a-z A-Z|wc -c"),
            ParsedLine::Pipeline {
                stages: vec![
                    argv(&["echo", "hello"]),
                    argv(&["tr", "a-z", "A-Z"]),
                    argv(&["wc", "-c"]),
                ],
                background: false,
            }
        );
    }

    #[test]
    fn background_comes_from_last_stage() {
        assert_eq!(
            parse_line("yes | head -n 1 &"),
            ParsedLine::Pipeline {
                stages: vec![argv(&["yes"]), argv(&["head", "-n", "1"])],
                background: true,
            }
        );

        let ParsedLine::Pipeline { stages, background } = parse_line("sleep 1 & | cat") else {
            panic!("expected a pipeline");
        };
        assert!(!background);
        assert_eq!(stages[0], argv(&["sleep", "1"]));
    }

    #[test]
    fn empty_stages_are_kept_for_the_caller_to_reject() {
        let ParsedLine::Pipeline { stages, .. } = parse_line("ls | | wc") else {
            panic!("expected a pipeline");
        };
        assert_eq!(stages.len(), 3);
        assert!(stages[1].is_empty());
    }
}
