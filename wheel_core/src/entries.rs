// Entry list: the ordered, possibly repeating names that become wheel segments.

use serde::{Deserialize, Serialize};

/// Ordered wheel entries. Index order is segment order, clockwise from angle 0.
/// Never holds blank entries; duplicates are separate segments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryList {
    entries: Vec<String>,
}

impl EntryList {
    pub fn new() -> Self {
        EntryList::default()
    }

    /// Parse raw input: one entry per line if there is any newline, otherwise
    /// comma separated. Pieces are trimmed and blanks dropped.
    pub fn parse(raw: &str) -> Self {
        let separator = if raw.contains('\n') { '\n' } else { ',' };
        let entries = raw
            .split(separator)
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect();
        EntryList { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Index of the first entry equal to `value`.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.entries.iter().position(|e| e == value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    /// First entry containing `needle`, ignoring case.
    pub fn find_containing(&self, needle: &str) -> Option<&str> {
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.to_lowercase().contains(&needle))
            .map(String::as_str)
    }

    /// Remove the first entry equal to `value`. Returns its former index.
    pub fn remove_first(&mut self, value: &str) -> Option<usize> {
        let index = self.position(value)?;
        self.entries.remove(index);
        Some(index)
    }

    /// One entry per line, the form written back to the input field.
    pub fn to_text(&self) -> String {
        self.entries.join("\n")
    }
}

impl<S: Into<String>> FromIterator<S> for EntryList {
    /// Build from already-split values; blank ones are still dropped.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(Into::into)
            .map(|e: String| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        EntryList { entries }
    }
}
