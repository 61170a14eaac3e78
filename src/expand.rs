//! `$NAME` substitution.
//!
//! A word that starts with `$` is replaced as a whole by the value of `NAME`,
//! looked up first among exported variables and then among shell-local ones.
//! Unset or empty variables produce an empty word, and empty words are dropped
//! from the argument vector before it is validated or executed.

use crate::env::Environment;
use crate::locals::LocalVariables;
use crate::trace_categories;
use std::borrow::Cow;

/// Resolve a single word.
///
/// Words not starting with `$` are returned unchanged. Values are not
/// re-scanned, so a variable holding `$OTHER` expands to that literal text.
pub fn substitute<'a>(word: &'a str, env: &'a Environment, locals: &'a LocalVariables) -> Cow<'a, str> {
    let Some(name) = word.strip_prefix('$') else {
        return Cow::Borrowed(word);
    };

    let value = env
        .get_var(name)
        .or_else(|| locals.get(name))
        .unwrap_or_default();

    tracing::debug!(target: trace_categories::EXPANSION, name, value, "substituted");
    Cow::Borrowed(value)
}

/// Substitute every word of `argv`, left to right, and drop words that became empty.
pub fn expand_argv(argv: &[String], env: &Environment, locals: &LocalVariables) -> Vec<String> {
    argv.iter()
        .map(|word| substitute(word, env, locals))
        .filter(|word| !word.is_empty())
        .map(Cow::into_owned)
        .collect()
}
