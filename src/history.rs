//! Bounded log of previously executed command lines.

use crate::error::{Result, ShellError};
use crate::lexer;
use crate::trace_categories;
use std::collections::VecDeque;

/// Number of entries kept when the shell starts.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Ordered, capacity-bounded command history.
///
/// Entries are stored oldest first. Recording the same line as the most recent
/// entry is a no-op, and once the store is full the oldest entry is evicted.
/// Resizing to zero disables recording but keeps what is already stored.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: VecDeque<String>,
    capacity: usize,
    enabled: bool,
}

impl HistoryStore {
    /// Create an empty store holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            enabled: capacity > 0,
        }
    }

    /// Append `line` unless recording is disabled, the line is blank, or it
    /// repeats the most recent entry. Returns `true` if the line was stored.
    pub fn record(&mut self, line: &str) -> bool {
        if !self.enabled || lexer::is_blank(line) {
            return false;
        }
        if self.entries.back().is_some_and(|last| last == line) {
            tracing::debug!(target: trace_categories::HISTORY, line, "duplicate suppressed");
            return false;
        }

        while self.entries.len() >= self.capacity {
            let evicted = self.entries.pop_front();
            tracing::debug!(target: trace_categories::HISTORY, ?evicted, "evicted");
        }
        self.entries.push_back(line.to_owned());
        true
    }

    /// Entries numbered from 1, most recent first.
    pub fn list(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .rev()
            .enumerate()
            .map(|(i, line)| (i + 1, line.as_str()))
    }

    /// Change the capacity.
    ///
    /// Negative sizes are rejected. Zero disables further recording and keeps
    /// the current entries and capacity. A positive size re-enables recording,
    /// evicting the oldest entries if the store is now too large.
    pub fn resize(&mut self, size: i64) -> Result<()> {
        let Ok(size) = usize::try_from(size) else {
            return Err(ShellError::InvalidHistorySize(size));
        };

        if size == 0 {
            self.enabled = false;
            tracing::debug!(target: trace_categories::HISTORY, "recording disabled");
            return Ok(());
        }

        self.enabled = true;
        self.capacity = size;
        while self.entries.len() > size {
            self.entries.pop_front();
        }
        self.entries.shrink_to(size);
        tracing::debug!(target: trace_categories::HISTORY, capacity = size, "resized");
        Ok(())
    }

    /// The `k`-th most recent entry (1-based).
    pub fn get(&self, k: i64) -> Result<&str> {
        let index = usize::try_from(k)
            .ok()
            .filter(|k| (1..=self.entries.len()).contains(k))
            .ok_or(ShellError::HistoryIndex(k))?;
        Ok(&self.entries[self.entries.len() - index])
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether new lines are currently being recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}
