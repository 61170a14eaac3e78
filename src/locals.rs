//! Shell-local variables, set with `local` and listed with `vars`.

use crate::error::{Result, ShellError};
use indexmap::IndexMap;

/// Default number of distinct local variables the table holds.
pub const MAX_LOCAL_VARS: usize = 128;

/// Bounded table of shell-local variables.
///
/// Names are unique and matched exactly (case-sensitive). Insertion order is
/// kept so `vars` prints variables in the order they were first defined.
#[derive(Debug, Clone)]
pub struct LocalVariables {
    vars: IndexMap<String, String>,
    capacity: usize,
}

impl LocalVariables {
    /// Create an empty table holding at most `capacity` names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vars: IndexMap::new(),
            capacity,
        }
    }

    /// Set `name` to `value`. An empty value removes the variable.
    ///
    /// Updating an existing name always succeeds; adding a new name fails once
    /// the table is full.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            self.remove(name);
            return Ok(());
        }

        if let Some(existing) = self.vars.get_mut(name) {
            value.clone_into(existing);
            return Ok(());
        }

        if self.vars.len() >= self.capacity {
            return Err(ShellError::TooManyLocals(self.capacity));
        }
        self.vars.insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    /// Remove `name`; returns the old value if there was one.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.vars.shift_remove(name)
    }

    /// Look up `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Variables in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of variables currently defined.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if no variable is defined.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl Default for LocalVariables {
    fn default() -> Self {
        Self::with_capacity(MAX_LOCAL_VARS)
    }
}
