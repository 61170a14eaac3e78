//! Tokenization of a single command (one pipeline stage) into an argument vector.

use crate::trace_categories;

/// Maximum number of tokens kept from one command; anything beyond is dropped.
pub const MAX_ARGS: usize = 128;

/// Token that, when it ends a command, requests background execution.
pub const BACKGROUND_MARKER: &str = "&";

/// Result of splitting one command into words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Program name followed by its arguments. Empty for a blank line.
    pub argv: Vec<String>,
    /// `true` when the command ended with a lone `&`.
    pub background: bool,
}

impl Tokens {
    /// Returns `true` when the command had no words at all.
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty()
    }
}

/// Characters that separate words. Tabs and other whitespace stay inside words.
pub const SEPARATORS: [char; 2] = [' ', '\n'];

/// Split `line` on [`SEPARATORS`] into at most [`MAX_ARGS`] words.
///
/// A trailing `&` is removed from the words and reported through
/// [`Tokens::background`]. There is no quoting or escaping: every run of
/// non-separator characters is one word.
pub fn split_into_tokens(line: &str) -> Tokens {
    let mut argv: Vec<String> = words(line)
        .take(MAX_ARGS)
        .map(str::to_owned)
        .collect();

    let background = argv.last().is_some_and(|last| last == BACKGROUND_MARKER);
    if background {
        argv.pop();
    }

    tracing::debug!(target: trace_categories::PARSE, ?argv, background, "tokenized");
    Tokens { argv, background }
}

/// Returns the first word of `line`, if there is one.
pub fn first_token(line: &str) -> Option<&str> {
    words(line).next()
}

/// Returns `true` when `line` has no words.
pub fn is_blank(line: &str) -> bool {
    first_token(line).is_none()
}

fn words(line: &str) -> impl Iterator<Item = &str> {
    line.split(SEPARATORS).filter(|word| !word.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn argv(line: &str) -> Vec<String> {
        split_into_tokens(line).argv
    }

    #[test]
    fn splits_on_spaces_and_newlines() {
        assert_eq!(argv("ls  -l /tmp\n"), vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn tabs_stay_inside_words() {
        assert_eq!(argv("printf a\tb"), vec!["printf", "a\tb"]);
        assert_eq!(argv("\t"), vec!["\t"]);
        assert!(!is_blank("\t"));
    }

    #[test]
    fn blank_line_is_empty() {
        let tokens = split_into_tokens("   \n");
        assert!(tokens.is_empty());
        assert!(!tokens.background);
    }

    #[test]
    fn trailing_ampersand_sets_background() {
        let tokens = split_into_tokens("sleep 10 &");
        assert_eq!(tokens.argv, vec!["sleep", "10"]);
        assert!(tokens.background);
    }

    #[test]
    fn ampersand_elsewhere_is_a_plain_word() {
        let tokens = split_into_tokens("echo & done");
        assert_eq!(tokens.argv, vec!["echo", "&", "done"]);
        assert!(!tokens.background);

        let glued = split_into_tokens("sleep 1&");
        assert_eq!(glued.argv, vec!["sleep", "1&"]);
        assert!(!glued.background);
    }

    #[test]
    fn lone_ampersand_leaves_no_command() {
        let tokens = split_into_tokens("&");
        assert!(tokens.is_empty());
        assert!(tokens.background);
    }

    #[test]
    fn excess_words_are_truncated() {
        let line = (0..200).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");
        let words = argv(&line);
        assert_eq!(words.len(), MAX_ARGS);
        assert_eq!(words.last().map(String::as_str), Some("127"));
    }

    #[test]
    fn first_token_skips_leading_whitespace() {
        assert_eq!(first_token("  history set 3"), Some("history"));
        assert_eq!(first_token(" \n "), None);
        assert!(is_blank("  \n"));
    }
}
