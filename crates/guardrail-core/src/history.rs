//! Caller-owned, append-only run log.
//!
//! Validators never keep reports themselves. A caller that wants a history
//! owns a `History` and hands it to the `*_recorded` entry points.

use serde::{Deserialize, Serialize};

/// Append-only list of reports, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History<T> {
    entries: Vec<T>,
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry and return a reference to it.
    pub fn record(&mut self, entry: T) -> &T {
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        &self.entries[last]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&T> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a History<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_in_order() {
        let mut history = History::new();
        assert!(history.is_empty());

        assert_eq!(*history.record("first"), "first");
        history.record("second");

        assert_eq!(history.len(), 2);
        assert_eq!(history.last(), Some(&"second"));
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec!["first", "second"]);
    }
}
