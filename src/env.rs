use crate::trace_categories;
use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// The environment handed to every child process.
///
/// Captured once from the process at start-up. `export` edits `vars`, and each
/// child is spawned with exactly these variables in `current_dir`, so the shell
/// never has to mutate its own process environment.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Exported variables (e.g. PATH, HOME).
    pub vars: HashMap<String, String>,
    /// Working directory for command execution.
    pub current_dir: PathBuf,
    /// Set by `exit`; the dispatch loop stops once this is true.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process environment and working directory.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_vars(stdenv::vars_os(), current_dir)
    }

    /// Build from raw `(name, value)` pairs. Pairs that are not valid UTF-8 are
    /// left out, since `$NAME` lookups and `export` only deal in text.
    pub fn from_vars(
        vars: impl IntoIterator<Item = (OsString, OsString)>,
        current_dir: PathBuf,
    ) -> Self {
        let vars = vars
            .into_iter()
            .filter_map(|(key, val)| match (key.into_string(), val.into_string()) {
                (Ok(key), Ok(val)) => Some((key, val)),
                (key, _) => {
                    tracing::debug!(
                        target: trace_categories::COMMANDS,
                        ?key,
                        "skipping variable that is not valid UTF-8"
                    );
                    None
                }
            })
            .collect();
        Self {
            vars,
            current_dir,
            should_exit: false,
        }
    }

    /// An environment with no variables, rooted at `current_dir`.
    pub fn empty(current_dir: PathBuf) -> Self {
        Self {
            vars: HashMap::new(),
            current_dir,
            should_exit: false,
        }
    }

    /// Value of an exported variable.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Set or override an exported variable.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// `export NAME=VALUE`: an empty value unsets the variable.
    pub fn export(&mut self, key: &str, val: &str) {
        if val.is_empty() {
            self.vars.remove(key);
        } else {
            self.set_var(key, val);
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::env::Environment;
    use std::env as stdenv;
    use std::ffi::OsString;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::empty(stdenv::current_dir().unwrap());

        // initially absent
        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");

        assert_eq!(env.get_var("KEY"), Some("VALUE"));
    }

    #[test]
    fn test_export_empty_value_unsets() {
        let mut env = Environment::empty(stdenv::current_dir().unwrap());
        env.export("FOO", "bar");
        assert_eq!(env.get_var("FOO"), Some("bar"));

        env.export("FOO", "");
        assert_eq!(env.get_var("FOO"), None);
    }

    #[test]
    #[cfg(unix)]
    fn non_utf8_variables_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("GOOD"), OsString::from("yes")),
            (OsString::from("BAD_VALUE"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![b'B', 0xff]), OsString::from("x")),
        ];
        let env = Environment::from_vars(vars, stdenv::temp_dir());
        assert_eq!(env.get_var("GOOD"), Some("yes"));
        assert_eq!(env.get_var("BAD_VALUE"), None);
        assert_eq!(env.vars.len(), 1);
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
    }
}
